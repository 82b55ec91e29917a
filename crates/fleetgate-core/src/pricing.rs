//! Plan pricing calculations.
//!
//! Prices are integers in the currency's minor unit. VAT is applied as
//! a separate explicit step and never folded into stored plan prices:
//! the VAT rate is a tenant/jurisdiction setting that changes
//! independently of plan pricing.

use crate::models::plan::Plan;
use crate::models::subscription::BillingPeriod;

/// Discounted price (excluding VAT) for a plan over a duration.
///
/// `base * (1 - discount/100)`, rounded half-up to the minor unit.
pub fn price_for(plan: &Plan, duration: BillingPeriod) -> i64 {
    let (base, discount) = match duration {
        BillingPeriod::SixMonths => (plan.price_6_months, plan.discount_6_months),
        BillingPeriod::TwelveMonths => (plan.price_12_months, plan.discount_12_months),
    };
    apply_discount(base, discount)
}

/// Apply a whole-percent discount with half-up rounding.
fn apply_discount(base: i64, percent: u8) -> i64 {
    let pct = i64::from(percent.min(100));
    (base * (100 - pct) + 50) / 100
}

/// Gross price: `price_ht * (1 + vat_rate)`, rounded to the minor unit.
pub fn with_vat(price_ht: i64, vat_rate: f64) -> i64 {
    (price_ht as f64 * (1.0 + vat_rate)).round() as i64
}
