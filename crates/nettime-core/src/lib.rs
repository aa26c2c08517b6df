//! nettime-core - Core types and traits for the netTime client.

pub mod credentials;
pub mod error;
pub mod task;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use task::{AsyncTask, PollConfig, TaskId, TaskPoller, TaskStarted, TaskState, TaskStatus};
pub use tokens::AccessToken;
pub use traits::TaskApi;
pub use types::{BaseUrl, Query};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
