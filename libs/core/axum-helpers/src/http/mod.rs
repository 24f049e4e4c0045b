//! HTTP middleware module.

pub mod security;

pub use security::security_headers;
