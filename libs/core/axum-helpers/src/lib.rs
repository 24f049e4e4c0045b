//! # Axum Helpers
//!
//! Shared HTTP infrastructure for the workspace APIs:
//!
//! - [`response::ApiResponse`]: the uniform `{success, message, data, error}`
//!   envelope every endpoint responds with
//! - [`errors::AppError`]: application error type with `IntoResponse`
//! - [`server`]: router assembly with OpenAPI docs, CORS, security headers,
//!   liveness endpoint, and production graceful shutdown
//! - [`http`]: HTTP-level middleware

pub mod errors;
pub mod http;
pub mod response;
pub mod server;

pub use errors::AppError;
pub use response::ApiResponse;
