// Adapters layer: concrete implementations for external systems.

pub mod auth;
pub mod http;

pub use auth::{PasswordCredentials, TokenCredentials};
pub use http::HttpPortfolioApi;
