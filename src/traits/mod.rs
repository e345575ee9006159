//! Trait abstractions at the transport and storage seams.
//!
//! - [`HttpClient`] - request/response and streaming HTTP
//! - [`SessionStore`] - persisted token and user

pub mod http;
pub mod session;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Method, Request, Response};
pub use session::{Session, SessionError, SessionStore};
