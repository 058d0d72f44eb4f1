pub mod api_client;
pub mod session_auth;

pub use api_client::{ApiClient, NOT_AUTHORIZED_MARKER};
pub use session_auth::{tokio_sleeper, SessionAuth, Sleeper};
