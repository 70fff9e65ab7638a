//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の in-memory 実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryTaskStore**: タスクと依存辺の正本
//! - **InMemoryUserDirectory**: assignee 表示と assign 先の存在確認
//!
//! # 本番用実装
//! RDB 実装などは別クレートに配置します。

pub mod inmem_store;
pub mod inmem_users;

pub use self::inmem_store::InMemoryTaskStore;
pub use self::inmem_users::InMemoryUserDirectory;
