//! CodeGenerator port - task code 生成の抽象化
//!
//! code は外部に公開される不変の識別子。一意性の最終確認は
//! `TaskStore::code_exists` で行い、衝突したら生成し直す（app 層）。

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::TaskCode;

pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> TaskCode;
}

/// `TSK-` + 12 random uppercase alphanumerics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> TaskCode {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TaskCode::SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        TaskCode::from_generated(format!("{}{suffix}", TaskCode::PREFIX))
    }
}
