use crate::domain::model::{Allocation, AllocationItem, AllocationRequest, AllocationResult};
use crate::utils::error::{PortfolioError, Result};

/// Splits `total_amount` across `items` in proportion to each item's weight.
///
/// Allocations keep full precision; round with [`format_amount`] only when
/// displaying them.
pub fn allocate(total_amount: f64, items: &[AllocationItem]) -> Result<AllocationResult> {
    if !total_amount.is_finite() {
        return Err(PortfolioError::invalid_input(format!(
            "total amount must be a finite number, got {}",
            total_amount
        )));
    }
    if total_amount < 0.0 {
        return Err(PortfolioError::invalid_input(format!(
            "total amount cannot be negative, got {}",
            total_amount
        )));
    }
    if items.is_empty() {
        return Err(PortfolioError::invalid_input("at least one item is required"));
    }
    if let Some(item) = items.iter().find(|item| item.weight == 0) {
        return Err(PortfolioError::invalid_input(format!(
            "weight for '{}' must be positive",
            item.identifier
        )));
    }

    let total_weight: u64 = items.iter().map(|item| u64::from(item.weight)).sum();
    if total_weight == 0 {
        return Err(PortfolioError::invalid_input("total weight must be positive"));
    }

    let total_weight = total_weight as f64;
    let allocations = items
        .iter()
        .map(|item| Allocation {
            identifier: item.identifier.clone(),
            // Dividing first keeps totals near f64::MAX from overflowing.
            allocated_amount: total_amount / total_weight * f64::from(item.weight),
        })
        .collect();

    tracing::debug!(
        "Allocated {} across {} items (total weight {})",
        total_amount,
        items.len(),
        total_weight
    );

    Ok(AllocationResult { allocations })
}

impl AllocationRequest {
    pub fn new(total_amount: f64, items: Vec<AllocationItem>) -> Self {
        Self {
            total_amount,
            items,
        }
    }

    pub fn allocate(&self) -> Result<AllocationResult> {
        allocate(self.total_amount, &self.items)
    }
}

/// Currency rendering for display only.
pub fn format_amount(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}
