use crate::core::allocation::allocate;
use crate::domain::model::{
    AllocationItem, AllocationResult, Portfolio, PortfolioAsset, PortfolioDraft,
};
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::Validate;

pub const SUPPORTED_EXCHANGE: &str = "Bybit";
pub const DEFAULT_SYMBOL: &str = "GALAUSDT";
pub const LEVERAGE_OPTIONS: [u32; 2] = [1, 2];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRow {
    pub symbol: String,
    pub leverage: u32,
}

impl AssetRow {
    pub fn new(symbol: &str, leverage: u32) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            leverage,
        }
    }
}

impl Default for AssetRow {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOL, 1)
    }
}

/// Editable state of a portfolio before it is sent to the API.
#[derive(Clone, Default)]
pub struct PortfolioForm {
    pub name: String,
    pub total_amount: Option<f64>,
    pub api_key: String,
    pub api_secret: String,
    assets: Vec<AssetRow>,
}

impl std::fmt::Debug for PortfolioForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioForm")
            .field("name", &self.name)
            .field("total_amount", &self.total_amount)
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

impl PortfolioForm {
    pub fn new() -> Self {
        Self {
            assets: vec![AssetRow::default()],
            ..Default::default()
        }
    }

    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let mut assets: Vec<AssetRow> = portfolio
            .assets
            .iter()
            .map(|asset| AssetRow::new(&asset.symbol, asset.leverage))
            .collect();
        if assets.is_empty() {
            assets.push(AssetRow::default());
        }

        Self {
            name: portfolio.name.clone(),
            total_amount: Some(portfolio.total_amount),
            api_key: portfolio.api_key.clone(),
            api_secret: portfolio.api_secret.clone(),
            assets,
        }
    }

    /// Replaces all rows. An empty list falls back to the single default row.
    pub fn with_assets(mut self, rows: Vec<AssetRow>) -> Self {
        self.assets = if rows.is_empty() {
            vec![AssetRow::default()]
        } else {
            rows
        };
        self
    }

    pub fn exchange(&self) -> &str {
        SUPPORTED_EXCHANGE
    }

    pub fn assets(&self) -> &[AssetRow] {
        &self.assets
    }

    pub fn add_asset(&mut self) {
        self.assets.push(AssetRow::default());
    }

    pub fn remove_asset(&mut self, index: usize) -> Result<AssetRow> {
        self.check_index(index)?;
        if self.assets.len() == 1 {
            return Err(PortfolioError::validation(
                "assets",
                "a portfolio needs at least one asset",
            ));
        }
        Ok(self.assets.remove(index))
    }

    pub fn set_symbol(&mut self, index: usize, symbol: &str) -> Result<()> {
        self.check_index(index)?;
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(PortfolioError::validation(
                format!("assets[{}].symbol", index),
                "symbol cannot be empty",
            ));
        }
        self.assets[index].symbol = symbol;
        Ok(())
    }

    pub fn set_leverage(&mut self, index: usize, leverage: u32) -> Result<()> {
        self.check_index(index)?;
        check_leverage(index, leverage)?;
        self.assets[index].leverage = leverage;
        Ok(())
    }

    /// Per-row amounts shown next to each asset. Nothing is shown until a
    /// positive total is entered.
    pub fn calculated_values(&self) -> Result<Option<AllocationResult>> {
        match self.total_amount {
            Some(total) if total > 0.0 => allocate(total, &self.allocation_items()).map(Some),
            _ => Ok(None),
        }
    }

    pub fn to_draft(&self) -> Result<PortfolioDraft> {
        self.validate()?;
        let total_amount = self.total_amount.unwrap_or_default();
        let allocations = allocate(total_amount, &self.allocation_items())?;

        let assets = self
            .assets
            .iter()
            .zip(allocations.iter())
            .map(|(row, allocation)| PortfolioAsset {
                symbol: row.symbol.clone(),
                amount_in_usd: allocation.allocated_amount,
                leverage: row.leverage,
            })
            .collect();

        Ok(PortfolioDraft {
            name: self.name.trim().to_string(),
            total_amount,
            exchange: SUPPORTED_EXCHANGE.to_string(),
            api_key: self.api_key.trim().to_string(),
            api_secret: self.api_secret.trim().to_string(),
            assets,
        })
    }

    fn allocation_items(&self) -> Vec<AllocationItem> {
        self.assets
            .iter()
            .map(|row| AllocationItem::new(row.symbol.clone(), row.leverage))
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.assets.len() {
            return Err(PortfolioError::validation(
                "assets",
                format!(
                    "row {} does not exist ({} rows)",
                    index,
                    self.assets.len()
                ),
            ));
        }
        Ok(())
    }
}

fn check_leverage(index: usize, leverage: u32) -> Result<()> {
    if !LEVERAGE_OPTIONS.contains(&leverage) {
        return Err(PortfolioError::validation(
            format!("assets[{}].leverage", index),
            format!("leverage must be 1 or 2, got {}", leverage),
        ));
    }
    Ok(())
}

impl Validate for PortfolioForm {
    fn validate(&self) -> Result<()> {
        let missing = [
            ("name", self.name.trim().is_empty()),
            ("total_amount", self.total_amount.is_none()),
            ("api_key", self.api_key.trim().is_empty()),
            ("api_secret", self.api_secret.trim().is_empty()),
        ];
        if let Some((field, _)) = missing.iter().find(|(_, is_missing)| *is_missing) {
            return Err(PortfolioError::validation(
                *field,
                "please fill in all fields",
            ));
        }

        let total = self.total_amount.unwrap_or_default();
        if !(total.is_finite() && total > 0.0) {
            return Err(PortfolioError::validation(
                "total_amount",
                format!("total amount must be greater than zero, got {}", total),
            ));
        }

        for (index, row) in self.assets.iter().enumerate() {
            if row.symbol.is_empty() {
                return Err(PortfolioError::validation(
                    format!("assets[{}].symbol", index),
                    "symbol cannot be empty",
                ));
            }
            check_leverage(index, row.leverage)?;
        }

        Ok(())
    }
}
