//! InMemoryUserDirectory - 開発・テスト用のユーザー一覧

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Page, PageRequest, User, UserFilter, UserId};
use crate::ports::{StoreError, UserDirectory};

#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a fixed set of users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, StoreError> {
        let users = self.users.read().await;
        let mut matching: Vec<User> = users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(Page::slice(matching, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn user(n: u64) -> User {
        User {
            id: UserId::new(n),
            name: format!("user {n}"),
            email: format!("user{n}@example.com"),
            role: Role::Member,
        }
    }

    fn named(n: u64, name: &str, role: Role) -> User {
        User {
            id: UserId::new(n),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
        }
    }

    #[tokio::test]
    async fn finds_known_users_only() {
        let directory = InMemoryUserDirectory::with_users([user(1)]);
        directory.insert(user(2)).await;

        assert_eq!(directory.find_user(UserId::new(2)).await.unwrap(), Some(user(2)));
        assert!(directory.user_exists(UserId::new(1)).await.unwrap());
        assert!(!directory.user_exists(UserId::new(3)).await.unwrap());
    }

    #[tokio::test]
    async fn lists_users_by_name_with_filters() {
        let directory = InMemoryUserDirectory::with_users([
            named(1, "Zoe", Role::Manager),
            named(2, "Bob", Role::Member),
            named(3, "Alice", Role::Member),
        ]);

        let all = directory
            .list_users(&UserFilter::default(), PageRequest::new(1, 2))
            .await
            .unwrap();
        let names: Vec<&str> = all.items.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(all.pagination.total, 3);
        assert!(all.pagination.has_more_pages);

        let managers = UserFilter {
            role: Some(Role::Manager),
            search: None,
        };
        let page = directory
            .list_users(&managers, PageRequest::new(1, 15))
            .await
            .unwrap();
        assert_eq!(page.items, vec![named(1, "Zoe", Role::Manager)]);

        let search = UserFilter {
            role: None,
            search: Some("bob@".into()),
        };
        let page = directory
            .list_users(&search, PageRequest::new(1, 15))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, UserId::new(2));
    }
}
