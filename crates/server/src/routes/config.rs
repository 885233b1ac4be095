use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use serde::Serialize;
use services::services::config::Config;
use utils::response::ApiResponse;

use crate::DeploymentImpl;

#[derive(Debug, Serialize)]
pub struct Info {
    pub config: Config,
    pub version: &'static str,
}

pub async fn get_info(
    State(deployment): State<DeploymentImpl>,
) -> ResponseJson<ApiResponse<Info>> {
    let config = deployment.config().read().await.clone();

    ResponseJson(ApiResponse::success(Info {
        config,
        version: env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().route("/info", get(get_info))
}
