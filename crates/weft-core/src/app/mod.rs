//! App - アプリケーション層
//!
//! このモジュールは、ports と engine を組み合わせて各オペレーションを実装します。
//!
//! # 主要コンポーネント
//! - **TaskServiceBuilder**: 構築とワイヤリング
//! - **TaskService**: タスク・依存関係・ユーザー一覧のオペレーション
//! - **views**: 外部に返す DTO（内部 id は含めない）
//! - **query**: 一覧取得クエリ（タスク・ユーザー）のパース

pub mod builder;
pub mod query;
pub mod task_service;
pub mod views;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, TaskServiceBuilder};
pub use self::query::{ListTasksQuery, ListUsersQuery};
pub use self::task_service::TaskService;
pub use self::views::{
    DependencyReport, DependencyView, SkippedDependency, TaskDetails, TaskView, UserView,
};
