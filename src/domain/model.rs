use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One weighted line of an allocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationItem {
    pub identifier: String,
    pub weight: u32,
}

impl AllocationItem {
    pub fn new(identifier: impl Into<String>, weight: u32) -> Self {
        Self {
            identifier: identifier.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub total_amount: f64,
    pub items: Vec<AllocationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub identifier: String,
    pub allocated_amount: f64,
}

/// Allocations in the same order and cardinality as the request items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationResult {
    pub allocations: Vec<Allocation>,
}

impl AllocationResult {
    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.iter()
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.allocations.iter().map(|a| a.allocated_amount).sum()
    }

    /// First allocation for `identifier`; identifiers may repeat.
    pub fn get(&self, identifier: &str) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| a.identifier == identifier)
            .map(|a| a.allocated_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAsset {
    pub symbol: String,
    pub amount_in_usd: f64,
    pub leverage: u32,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    pub total_amount: f64,
    pub exchange: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub assets: Vec<PortfolioAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl fmt::Debug for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Portfolio")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("total_amount", &self.total_amount)
            .field("exchange", &self.exchange)
            .field("assets", &self.assets)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Body of the create and update calls.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDraft {
    pub name: String,
    pub total_amount: f64,
    pub exchange: String,
    pub api_key: String,
    pub api_secret: String,
    pub assets: Vec<PortfolioAsset>,
}

impl fmt::Debug for PortfolioDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioDraft")
            .field("name", &self.name)
            .field("total_amount", &self.total_amount)
            .field("exchange", &self.exchange)
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoInfo {
    #[serde(alias = "code")]
    pub symbol: String,
    pub name: String,
}

impl fmt::Display for CryptoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPortfolio {
    pub portfolio_id: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub symbol: String,
    #[serde(default)]
    pub historical_values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(default)]
    pub cumulative_profitability: BTreeMap<String, f64>,
    #[serde(default)]
    pub assets: Vec<AssetPerformance>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The server generates the credentials and returns them once.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user_id: i64,
    pub username: String,
    pub password: String,
}

/// Authenticated user plus the bearer sent with every API call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub bearer: Option<String>,
}

impl Session {
    pub fn new(user_id: i64, bearer: Option<String>) -> Self {
        Self { user_id, bearer }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
