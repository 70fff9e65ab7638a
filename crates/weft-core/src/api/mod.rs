//! Api - 境界層（JSON envelope と HTTP status）
//!
//! ルーティングや HTTP サーバーは持たない。`TaskApi` の各メソッドが
//! `ApiReply { status, body }` を返し、transport 側はそれを書き出すだけ。

pub mod endpoints;
pub mod error;
pub mod response;

pub use self::endpoints::TaskApi;
pub use self::error::{ApiError, status_for};
pub use self::response::{ApiReply, ApiResponse};
