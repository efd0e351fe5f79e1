pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{HttpPortfolioApi, PasswordCredentials, TokenCredentials};
pub use crate::app::PortfolioService;
pub use crate::config::ClientConfig;
pub use crate::core::allocation::{allocate, format_amount};
pub use crate::core::form::PortfolioForm;
pub use crate::domain::model::{Allocation, AllocationItem, AllocationRequest, AllocationResult};
pub use crate::utils::error::{PortfolioError, Result};
