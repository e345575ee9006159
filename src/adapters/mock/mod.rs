//! Test doubles for the trait seams.
//!
//! - [`MockHttpClient`] - canned responses and request recording
//! - [`InMemorySessionStore`] - session kept in memory

pub mod http;
pub mod session;

pub use http::{MockHttpClient, MockResponse};
pub use session::InMemorySessionStore;
