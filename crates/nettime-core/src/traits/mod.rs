//! Core traits shared between the client and its collaborators.

mod task_api;

pub use task_api::TaskApi;
