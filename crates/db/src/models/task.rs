use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::task, types::TaskStatus};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found")]
    TaskNotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    /// Omitted field keeps the stored date, explicit `null` clears it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Maps any present JSON value (including `null`) to `Some`, so a missing
/// field and an explicit `null` stay distinguishable.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn validate_text(field: &'static str, value: &str) -> Result<(), TaskError> {
    if value.trim().is_empty() {
        return Err(TaskError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            due_date: model.due_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl Task {
    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, TaskError> {
        let mut query = task::Entity::find().order_by_desc(task::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(task::Column::Status.eq(status));
        }

        let models = query.all(db).await?;
        Ok(models.into_iter().map(Task::from).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, TaskError> {
        Ok(task::Entity::find_by_id(id).one(db).await?.map(Task::from))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, TaskError> {
        validate_text("title", &data.title)?;
        validate_text("description", &data.description)?;

        let now = Utc::now();
        let active = task::ActiveModel {
            id: Set(task_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            status: Set(TaskStatus::Pending),
            due_date: Set(data.due_date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(db).await?;
        Ok(model.into())
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        title: String,
        description: String,
        status: TaskStatus,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, TaskError> {
        validate_text("title", &title)?;
        validate_text("description", &description)?;

        let record = task::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        // `id` and `created_at` are never rewritten.
        let mut active: task::ActiveModel = record.into();
        active.title = Set(title);
        active.description = Set(description);
        active.status = Set(status);
        active.due_date = Set(due_date);
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(updated.into())
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), TaskError> {
        let result = task::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(TaskError::TaskNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> DatabaseConnection {
        // A pooled `sqlite::memory:` hands each connection its own database;
        // a single connection keeps the schema visible to every query.
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn new_task(title: &str, description: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: description.to_string(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_pending() {
        let db = setup_db().await;

        let task = Task::create(&db, &new_task("Write spec", "draft v1"), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date, None);
        assert_eq!(task.created_at, task.updated_at);

        let fetched = Task::find_by_id(&db, task.id).await.unwrap().unwrap();
        assert_eq!(fetched, task);
        assert_eq!(Task::find_by_id(&db, Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_rejects_blank_title_and_description() {
        let db = setup_db().await;

        let err = Task::create(&db, &new_task("   ", "draft v1"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        let err = Task::create(&db, &new_task("Write spec", ""), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        assert!(Task::find_all(&db, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_orders_newest_first_and_filters_by_status() {
        let db = setup_db().await;

        let first = Task::create(&db, &new_task("first", "a"), Uuid::new_v4())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = Task::create(&db, &new_task("second", "b"), Uuid::new_v4())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = Task::create(&db, &new_task("third", "c"), Uuid::new_v4())
            .await
            .unwrap();

        Task::update(
            &db,
            second.id,
            second.title.clone(),
            second.description.clone(),
            TaskStatus::Completed,
            None,
        )
        .await
        .unwrap();

        let all = Task::find_all(&db, None).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        // The filtered list is exactly the matching subset, in the same order.
        let pending = Task::find_all(&db, Some(TaskStatus::Pending)).await.unwrap();
        let expected: Vec<Uuid> = all
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .map(|t| t.id)
            .collect();
        assert_eq!(
            pending.iter().map(|t| t.id).collect::<Vec<_>>(),
            expected
        );
        assert_eq!(pending.len(), 2);

        let completed = Task::find_all(&db, Some(TaskStatus::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, second.id);
    }

    #[tokio::test]
    async fn update_preserves_id_and_created_at() {
        let db = setup_db().await;

        let task = Task::create(&db, &new_task("Write spec", "draft v1"), Uuid::new_v4())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = Task::update(
            &db,
            task.id,
            "Write spec".to_string(),
            "draft v2".to_string(),
            TaskStatus::InProgress,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
        )
        .await
        .unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2026, 9, 1));
    }

    #[tokio::test]
    async fn update_can_clear_due_date() {
        let db = setup_db().await;

        let task = Task::create(
            &db,
            &CreateTask {
                title: "Write spec".to_string(),
                description: "draft v1".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let updated = Task::update(
            &db,
            task.id,
            task.title.clone(),
            task.description.clone(),
            task.status.clone(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(updated.due_date, None);
    }

    #[tokio::test]
    async fn update_missing_task_reports_not_found() {
        let db = setup_db().await;

        let err = Task::update(
            &db,
            Uuid::new_v4(),
            "title".to_string(),
            "description".to_string(),
            TaskStatus::Pending,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TaskError::TaskNotFound));
    }

    #[tokio::test]
    async fn delete_is_not_silently_idempotent() {
        let db = setup_db().await;

        let task = Task::create(&db, &new_task("Write spec", "draft v1"), Uuid::new_v4())
            .await
            .unwrap();

        Task::delete(&db, task.id).await.unwrap();
        let err = Task::delete(&db, task.id).await.unwrap_err();
        assert!(matches!(err, TaskError::TaskNotFound));
    }

    #[test]
    fn update_payload_distinguishes_missing_from_null_due_date() {
        let omitted: UpdateTask = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(omitted.due_date, None);

        let cleared: UpdateTask = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTask = serde_json::from_str(r#"{"due_date":"2026-09-01"}"#).unwrap();
        assert_eq!(
            set.due_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1))
        );
    }
}
