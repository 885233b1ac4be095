use std::collections::VecDeque;

use db::{
    models::task::{CreateTask, Task, UpdateTask},
    types::TaskStatus,
};
use uuid::Uuid;

use crate::{api::TaskApi, error::ClientError};

/// User-facing signal emitted by cache operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Failure(String),
    Info(String),
}

/// Local mirror of the visible task list.
///
/// Status advances are applied optimistically: the local entry flips before
/// the server confirms, and a failed confirmation restores the full
/// pre-mutation list before a fresh fetch re-syncs it. Creates and deletes
/// only reach the cache through the re-fetch that follows server
/// confirmation.
pub struct TaskCache<A: TaskApi> {
    api: A,
    tasks: Vec<Task>,
    filter: Option<TaskStatus>,
    notifications: VecDeque<Notification>,
}

impl<A: TaskApi> TaskCache<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            filter: None,
            notifications: VecDeque::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Option<TaskStatus> {
        self.filter.clone()
    }

    /// Switch the active status filter and replace the local list with the
    /// server's answer.
    pub async fn refresh(&mut self, filter: Option<TaskStatus>) -> Result<(), ClientError> {
        self.filter = filter;
        self.refetch().await
    }

    /// Advance the task's status one step, reflecting the change locally
    /// before the server confirms it.
    pub async fn advance(&mut self, id: Uuid) -> Result<(), ClientError> {
        let Some(position) = self.tasks.iter().position(|task| task.id == id) else {
            self.notify(Notification::Info(
                "Task is no longer in the visible list".to_string(),
            ));
            return Ok(());
        };

        let target = self.tasks[position].status.advance();
        let snapshot = self.tasks.clone();
        self.tasks[position].status = target.clone();

        let update = UpdateTask {
            status: Some(target),
            ..UpdateTask::default()
        };

        match self.api.update_task(id, &update).await {
            Ok(_) => {
                self.notify(Notification::Success("Task status updated".to_string()));
                let _ = self.refetch().await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Status update for task {id} failed, rolling back: {err}");
                self.rollback(snapshot);
                self.notify(Notification::Failure(format!(
                    "Failed to update task: {err}"
                )));
                let _ = self.refetch().await;
                Err(err)
            }
        }
    }

    /// Restore the full pre-mutation list, not just the touched task.
    pub fn rollback(&mut self, snapshot: Vec<Task>) {
        self.tasks = snapshot;
    }

    pub async fn create(&mut self, data: &CreateTask) -> Result<Task, ClientError> {
        match self.api.create_task(data).await {
            Ok(task) => {
                self.notify(Notification::Success(format!(
                    "Created task '{}'",
                    task.title
                )));
                let _ = self.refetch().await;
                Ok(task)
            }
            Err(err) => {
                self.notify(Notification::Failure(format!(
                    "Failed to create task: {err}"
                )));
                Err(err)
            }
        }
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        match self.api.delete_task(id).await {
            Ok(()) => {
                self.notify(Notification::Success("Task deleted".to_string()));
                let _ = self.refetch().await;
                Ok(())
            }
            Err(err) => {
                self.notify(Notification::Failure(format!(
                    "Failed to delete task: {err}"
                )));
                Err(err)
            }
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    async fn refetch(&mut self) -> Result<(), ClientError> {
        match self.api.list_tasks(self.filter.clone()).await {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                self.notify(Notification::Failure(format!(
                    "Failed to load tasks: {err}"
                )));
                Err(err)
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }
}
