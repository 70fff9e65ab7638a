//! Listing filters and pagination.

use chrono::NaiveDate;
use serde::Serialize;

use super::ids::UserId;
use super::task::{Task, TaskStatus};
use super::user::{Role, User};

/// Already-validated listing filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee: Option<UserId>,
    pub due_date_from: Option<NaiveDate>,
    pub due_date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

impl TaskFilter {
    /// Does `task` pass this filter? Soft-deleted tasks never match.
    pub fn matches(&self, task: &Task) -> bool {
        if task.is_deleted() {
            return false;
        }
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.assignee.is_some() && task.assignee != self.assignee {
            return false;
        }
        if let Some(from) = self.due_date_from
            && !task.due_date.is_some_and(|due| due >= from)
        {
            return false;
        }
        if let Some(to) = self.due_date_to
            && !task.due_date.is_some_and(|due| due <= to)
        {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// Already-validated user directory filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub role: Option<Role>,
    /// Case-insensitive substring of name or email.
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|role| user.role != role) {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) => {
                let needle = needle.to_lowercase();
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.per_page as usize
    }
}

/// Pagination block of the response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub from: Option<usize>,
    pub last_page: u32,
    pub per_page: u32,
    pub to: Option<usize>,
    pub total: usize,
    pub has_more_pages: bool,
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Cut `all` (already filtered and ordered) down to the requested page.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let request = PageRequest::new(request.page, request.per_page);
        let total = all.len();
        let per_page = request.per_page as usize;
        let last_page = total.div_ceil(per_page).max(1) as u32;
        let items: Vec<T> = all
            .into_iter()
            .skip(request.offset())
            .take(per_page)
            .collect();
        let (from, to) = if items.is_empty() {
            (None, None)
        } else {
            let first = request.offset() + 1;
            (Some(first), Some(first + items.len() - 1))
        };
        Self {
            items,
            pagination: Pagination {
                current_page: request.page,
                from,
                last_page,
                per_page: request.per_page,
                to,
                total,
                has_more_pages: request.page < last_page,
            },
        }
    }
}
