pub mod allocation;
pub mod chart;
pub mod form;

pub use crate::domain::model::{AllocationItem, AllocationRequest, AllocationResult};
pub use crate::domain::ports::{ConfigProvider, CredentialProvider, PortfolioApi};
pub use crate::utils::error::Result;
