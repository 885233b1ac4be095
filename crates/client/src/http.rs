use async_trait::async_trait;
use db::{
    models::task::{CreateTask, Task, UpdateTask},
    types::TaskStatus,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{api::TaskApi, error::ClientError};

/// reqwest-backed [`TaskApi`] speaking the server's JSON envelope.
pub struct HttpTaskApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpTaskApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::UnexpectedResponse(format!("invalid endpoint {path}: {err}")))
    }

    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        if !status.is_success() || !envelope.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "Request failed".to_string()),
            });
        }

        envelope
            .data
            .ok_or_else(|| ClientError::UnexpectedResponse("missing data field".to_string()))
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ClientError> {
        let mut url = self.endpoint("api/tasks")?;
        if let Some(status) = status {
            url.query_pairs_mut()
                .append_pair("status", &status.to_string());
        }

        let response = self.client.get(url).send().await?;
        Self::parse_envelope(response).await
    }

    async fn get_task(&self, id: Uuid) -> Result<Task, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&format!("api/tasks/{id}"))?)
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    async fn create_task(&self, data: &CreateTask) -> Result<Task, ClientError> {
        let response = self
            .client
            .post(self.endpoint("api/tasks")?)
            .json(data)
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    async fn update_task(&self, id: Uuid, data: &UpdateTask) -> Result<Task, ClientError> {
        let response = self
            .client
            .put(self.endpoint(&format!("api/tasks/{id}"))?)
            .json(data)
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("api/tasks/{id}"))?)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        // Failures still carry the JSON envelope.
        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        Err(ClientError::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        })
    }
}
