//! Engine - 依存グラフ以外のコアルール
//!
//! # 主要コンポーネント
//! - **Policy / RolePolicy**: 認可の一元評価
//! - **StatusTransitionGuard**: 完了ゲートと timestamp の副作用
//! - **PermissionView**: viewer ごとの射影
//! - **StatsCalculator**: 完了率などの集計

pub mod guard;
pub mod policy;
pub mod stats;
pub mod view;

pub use self::guard::{INCOMPLETE_DEPENDENCIES, StatusTransitionGuard};
pub use self::policy::{Action, Policy, PolicyDecision, RolePolicy};
pub use self::stats::{DependencyStats, StatsCalculator};
pub use self::view::PermissionView;
