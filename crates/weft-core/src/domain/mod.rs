//! Domain model (IDs, tasks, users, filters, errors).

pub mod errors;
pub mod filter;
pub mod ids;
pub mod task;
pub mod user;

pub use self::errors::{CoreError, FieldErrors};
pub use self::filter::{Page, PageRequest, Pagination, TaskFilter, UserFilter};
pub use self::ids::{TaskCode, TaskId, UserId};
pub use self::task::{NewTask, Task, TaskDraft, TaskStatus, TaskUpdate, UnknownStatus};
pub use self::user::{Actor, Role, UnknownRole, User};
