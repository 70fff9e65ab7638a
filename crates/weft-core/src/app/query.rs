//! Raw listing queries as they arrive from a caller (query string / JSON).
//!
//! Only parsing happens here; range checks live in `TaskService::list_tasks`
//! so every entry point gets them.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::PaginationConfig;
use crate::domain::{
    CoreError, FieldErrors, PageRequest, Role, TaskFilter, TaskStatus, UserFilter, UserId,
};

pub const STATUS_MESSAGE: &str =
    "The status must be one of: pending, in_progress, completed, canceled.";
pub const ROLE_MESSAGE: &str = "The role must be either Manager or User.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub assigned_to: Option<UserId>,
    pub due_date_from: Option<NaiveDate>,
    pub due_date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Parse a wire status, failing on field `status`.
pub fn parse_status(raw: &str) -> Result<TaskStatus, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::invalid_field("status", STATUS_MESSAGE))
}

impl ListTasksQuery {
    /// Turn the raw query into a filter and page request, filling defaults.
    pub fn into_parts(
        self,
        pagination: &PaginationConfig,
    ) -> Result<(TaskFilter, PageRequest), CoreError> {
        let mut fields = FieldErrors::new();

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<TaskStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    fields.insert("status".into(), vec![STATUS_MESSAGE.into()]);
                    None
                }
            },
        };
        if self.page == Some(0) {
            fields.insert("page".into(), vec!["The page must be at least 1.".into()]);
        }
        if let Some(err) = CoreError::from_fields(fields) {
            return Err(err);
        }

        let filter = TaskFilter {
            status,
            assignee: self.assigned_to,
            due_date_from: self.due_date_from,
            due_date_to: self.due_date_to,
            search: self.search.filter(|s| !s.trim().is_empty()),
        };
        let page = PageRequest {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(pagination.default_per_page),
        };
        Ok((filter, page))
    }
}

impl ListUsersQuery {
    pub fn into_parts(
        self,
        pagination: &PaginationConfig,
    ) -> Result<(UserFilter, PageRequest), CoreError> {
        let mut fields = FieldErrors::new();

        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    fields.insert("role".into(), vec![ROLE_MESSAGE.into()]);
                    None
                }
            },
        };
        if self.page == Some(0) {
            fields.insert("page".into(), vec!["The page must be at least 1.".into()]);
        }
        if let Some(err) = CoreError::from_fields(fields) {
            return Err(err);
        }

        let filter = UserFilter {
            role,
            search: self.search.filter(|s| !s.trim().is_empty()),
        };
        let page = PageRequest {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(pagination.default_per_page),
        };
        Ok((filter, page))
    }
}
