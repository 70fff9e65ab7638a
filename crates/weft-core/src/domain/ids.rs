//! Domain identifiers.
//!
//! Two kinds of identity live here:
//! - `Id<T>`: internal numeric identity assigned by the store. `TaskId` never
//!   leaves the crate boundary in serialized form; `UserId` is shared with the
//!   user directory and is shown in assignee views.
//! - `TaskCode`: the opaque external code (`TSK-` + 12 uppercase alphanumerics)
//!   that callers use to address a task.
//!
//! `Id<T>` uses a phantom marker so `TaskId` and `UserId` cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "task#", "user#"）
    fn prefix() -> &'static str;
}

/// Numeric identity with a phantom marker.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskMarker {}

impl IdMarker for TaskMarker {
    fn prefix() -> &'static str {
        "task#"
    }
}

/// User のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserMarker {}

impl IdMarker for UserMarker {
    fn prefix() -> &'static str {
        "user#"
    }
}

/// Storage-only identity of a task.
pub type TaskId = Id<TaskMarker>;

/// Identity of a user (assignee / creator / actor).
pub type UserId = Id<UserMarker>;

/// External task code: `TSK-` followed by 12 uppercase ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskCode(String);

impl TaskCode {
    pub const PREFIX: &'static str = "TSK-";
    pub const SUFFIX_LEN: usize = 12;

    /// Parse a code, returning `None` when it is not well formed.
    pub fn parse(raw: &str) -> Option<Self> {
        let suffix = raw.strip_prefix(Self::PREFIX)?;
        let well_formed = suffix.len() == Self::SUFFIX_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        well_formed.then(|| Self(raw.to_string()))
    }

    /// Wrap a code produced by a `CodeGenerator` without re-validating it.
    pub(crate) fn from_generated(code: String) -> Self {
        debug_assert!(Self::parse(&code).is_some(), "generated malformed code {code}");
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("malformed task code: {value}"))
    }
}

impl From<TaskCode> for String {
    fn from(code: TaskCode) -> Self {
        code.0
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
