//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（RDB, ユーザーディレクトリ, 時計, 乱数）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - TaskStore が source of truth（正本）。コアは状態を保持せず、毎回読み直す
//! - テスト容易性のため、時刻と code 生成も trait で差し替え可能にする

pub mod clock;
pub mod code_generator;
pub mod task_store;
pub mod user_directory;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::code_generator::{CodeGenerator, RandomCodeGenerator};
pub use self::task_store::{DependencyEdge, StoreError, TaskStore};
pub use self::user_directory::UserDirectory;
