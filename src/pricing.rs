use serde::Serialize;
use utoipa::ToSchema;

/// Server-side pricing policy applied at checkout. The client may send a
/// total for display, but the amounts charged always come from here.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    /// Tax rate in basis points (500 = 5%).
    pub tax_rate_bps: i64,
    /// Subtotal (minor units) at or above which shipping is free.
    pub free_shipping_threshold: i64,
    /// Flat shipping fee (minor units) below the threshold.
    pub shipping_fee: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceBreakdown {
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_fee: i64,
    pub total: i64,
}

impl PricingPolicy {
    pub const DEFAULT_TAX_RATE_BPS: i64 = 500;
    pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 100_000;
    pub const DEFAULT_SHIPPING_FEE: i64 = 5_000;

    pub fn quote(&self, subtotal: i64) -> PriceBreakdown {
        // Round tax half-up so truncation never undercharges.
        let tax = (subtotal * self.tax_rate_bps + 5_000) / 10_000;
        let shipping_fee = if subtotal >= self.free_shipping_threshold {
            0
        } else {
            self.shipping_fee
        };
        PriceBreakdown {
            subtotal,
            tax,
            shipping_fee,
            total: subtotal + tax + shipping_fee,
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate_bps: Self::DEFAULT_TAX_RATE_BPS,
            free_shipping_threshold: Self::DEFAULT_FREE_SHIPPING_THRESHOLD,
            shipping_fee: Self::DEFAULT_SHIPPING_FEE,
        }
    }
}
