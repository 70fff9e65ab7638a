//! UserDirectory port - ユーザー情報の参照
//!
//! 認証・ユーザー管理そのものは外部の責務。コアは assignee の表示、
//! assign 先の存在確認、Manager 向けのユーザー一覧にだけ使う。

use async_trait::async_trait;

use super::StoreError;
use crate::domain::{Page, PageRequest, User, UserFilter, UserId};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn user_exists(&self, id: UserId) -> Result<bool, StoreError> {
        Ok(self.find_user(id).await?.is_some())
    }

    /// Filtered, paginated listing ordered by name, then id.
    async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, StoreError>;
}
