//! Concrete implementations of the traits in `crate::traits`.
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileSessionStore`] - session persisted as a JSON file
//!
//! The [`mock`] submodule provides test doubles for both.

pub mod file_session;
pub mod mock;
pub mod reqwest_http;

pub use file_session::FileSessionStore;
pub use mock::{InMemorySessionStore, MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
