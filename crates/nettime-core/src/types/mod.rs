//! Core netTime types.
//!
//! These types validate their input at construction time, so a value that
//! exists is always usable in a request.

mod base_url;
mod query;

pub use base_url::BaseUrl;
pub use query::Query;
