//! TaskApi - TaskService の結果を envelope + status に変換する境界
//!
//! Transport-agnostic: each method takes already-authenticated input and
//! returns an `ApiReply` that an HTTP adapter can write out as is. Nothing
//! here returns `Err`; failures become error envelopes.

use http::StatusCode;
use serde::Serialize;
use tracing::warn;

use super::error::ApiError;
use super::response::{ApiReply, ApiResponse};
use crate::app::{ListTasksQuery, ListUsersQuery, TaskService};
use crate::config::Environment;
use crate::domain::{Actor, CoreError, NewTask, Page, TaskUpdate, UserId};

#[derive(Clone)]
pub struct TaskApi {
    service: TaskService,
    environment: Environment,
}

fn to_value<T: Serialize>(data: T) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(data).map_err(|e| CoreError::Unexpected(format!("serializing response: {e}")))
}

impl TaskApi {
    pub fn new(service: TaskService, environment: Environment) -> Self {
        Self {
            service,
            environment,
        }
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }

    fn fail(&self, err: CoreError) -> ApiReply {
        if matches!(err, CoreError::Forbidden(_)) {
            warn!(message = %err, "request forbidden");
        }
        ApiError::from_core(err, self.environment).into_reply()
    }

    fn reply<T: Serialize>(
        &self,
        status: StatusCode,
        message: &str,
        result: Result<T, CoreError>,
    ) -> ApiReply {
        match result.and_then(to_value) {
            Ok(data) => ApiReply::new(status, ApiResponse::ok(message).with_data(data)),
            Err(err) => self.fail(err),
        }
    }

    /// A page of items goes out as `data` with the pagination block beside it.
    fn paged<T: Serialize>(&self, message: &str, result: Result<Page<T>, CoreError>) -> ApiReply {
        let result = result.and_then(|page| Ok((to_value(&page.items)?, page.pagination)));
        match result {
            Ok((data, pagination)) => ApiReply::new(
                StatusCode::OK,
                ApiResponse::ok(message)
                    .with_data(data)
                    .with_pagination(pagination),
            ),
            Err(err) => self.fail(err),
        }
    }

    pub async fn list_tasks(&self, actor: &Actor, query: ListTasksQuery) -> ApiReply {
        let result = async {
            let (filter, page) = query.into_parts(self.service.pagination())?;
            self.service.list_tasks(actor, filter, page).await
        }
        .await;
        self.paged("Tasks retrieved successfully", result)
    }

    pub async fn list_users(&self, actor: &Actor, query: ListUsersQuery) -> ApiReply {
        let result = async {
            let (filter, page) = query.into_parts(self.service.pagination())?;
            self.service.list_users(actor, filter, page).await
        }
        .await;
        self.paged("Users retrieved successfully", result)
    }

    pub async fn create_task(&self, actor: &Actor, new_task: NewTask) -> ApiReply {
        let result = self.service.create_task(actor, new_task).await;
        self.reply(StatusCode::CREATED, "Task created successfully", result)
    }

    pub async fn get_task(&self, actor: &Actor, code: &str) -> ApiReply {
        let result = self.service.get_task(actor, code).await;
        self.reply(StatusCode::OK, "Task retrieved successfully", result)
    }

    pub async fn update_task(&self, actor: &Actor, code: &str, update: TaskUpdate) -> ApiReply {
        let result = self.service.update_task(actor, code, update).await;
        self.reply(StatusCode::OK, "Task updated successfully", result)
    }

    pub async fn update_status(&self, actor: &Actor, code: &str, status: &str) -> ApiReply {
        let result = self.service.update_status(actor, code, status).await;
        self.reply(StatusCode::OK, "Task status updated successfully", result)
    }

    pub async fn delete_task(&self, actor: &Actor, code: &str) -> ApiReply {
        match self.service.delete_task(actor, code).await {
            Ok(()) => ApiReply::new(StatusCode::OK, ApiResponse::ok("Task deleted successfully")),
            Err(err) => self.fail(err),
        }
    }

    pub async fn assign_task(&self, actor: &Actor, code: &str, user: UserId) -> ApiReply {
        let result = self.service.assign_task(actor, code, user).await;
        self.reply(StatusCode::OK, "Task assigned successfully", result)
    }

    pub async fn get_dependencies(&self, actor: &Actor, code: &str) -> ApiReply {
        let result = self.service.get_dependencies(actor, code).await;
        self.reply(StatusCode::OK, "Dependencies retrieved successfully", result)
    }

    /// A clean batch returns the refreshed task; anything skipped or failed
    /// returns the full report instead. Both are 200.
    pub async fn add_dependencies(&self, actor: &Actor, code: &str, dependency_codes: &[String]) -> ApiReply {
        match self.service.add_dependencies(actor, code, dependency_codes).await {
            Ok(report) if report.is_clean() => {
                self.reply(StatusCode::OK, "Dependencies added successfully", Ok(report.task))
            }
            Ok(report) => self.reply(StatusCode::OK, "Dependencies processed with some issues", Ok(report)),
            Err(err) => self.fail(err),
        }
    }

    pub async fn remove_dependency(&self, actor: &Actor, code: &str, dependency_code: &str) -> ApiReply {
        let result = self.service.remove_dependency(actor, code, dependency_code).await;
        self.reply(StatusCode::OK, "Dependency removed successfully", result)
    }
}
