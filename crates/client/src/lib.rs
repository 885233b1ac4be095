mod api;
mod cache;
mod error;
mod http;

pub use api::TaskApi;
pub use cache::{Notification, TaskCache};
pub use error::ClientError;
pub use http::HttpTaskApi;
