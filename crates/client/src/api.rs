use async_trait::async_trait;
use db::{
    models::task::{CreateTask, Task, UpdateTask},
    types::TaskStatus,
};
use uuid::Uuid;

use crate::error::ClientError;

/// Request surface of the task service, as seen from the client side.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ClientError>;

    async fn get_task(&self, id: Uuid) -> Result<Task, ClientError>;

    async fn create_task(&self, data: &CreateTask) -> Result<Task, ClientError>;

    async fn update_task(&self, id: Uuid, data: &UpdateTask) -> Result<Task, ClientError>;

    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError>;
}
