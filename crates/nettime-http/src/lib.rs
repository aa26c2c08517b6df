//! nettime-http - HTTP client for the netTime time-and-attendance API.
//!
//! [`NetTimeClient`] owns the session: it logs in, derives the request
//! headers from the session token, reconnects once when the server rejects
//! the session, and resolves server-side async tasks through
//! [`nettime_core::TaskPoller`].

mod attendance;
mod client;
mod config;
mod container;
mod endpoints;
mod session;

pub use attendance::{ACTIVATORS_CONTAINER, API_READER, Clocking, Planning};
pub use client::NetTimeClient;
pub use config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use container::{ContainerAction, EMPLOYEES_CONTAINER, ElementsOptions, NEW_ELEMENT};
pub use session::session_headers;
