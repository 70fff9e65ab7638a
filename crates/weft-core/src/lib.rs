//! weft-core
//!
//! Task dependency graph engine: tasks that wait on other tasks, a completion
//! gate, role-scoped views and completion statistics.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, user, filter, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, UserDirectory, Clock, CodeGenerator）
//! - **graph**: DependencyGraph（辺の検証・循環検出）と EdgeIndex
//! - **engine**: StatusTransitionGuard, Policy, PermissionView, StatsCalculator
//! - **app**: TaskService（各オペレーションの組み立て）と TaskServiceBuilder
//! - **api**: JSON envelope と HTTP status へのマッピング
//! - **impls**: InMemoryTaskStore / InMemoryUserDirectory（開発・テスト用）
//! - config / logging: 設定ファイルとログ初期化

pub mod domain;
pub mod ports;
pub mod graph;
pub mod engine;
pub mod app;
pub mod api;
pub mod impls;

pub mod config;
pub mod logging;
