//! Subscription record model.
//!
//! A tenant has at most one *current* subscription — the most recently
//! created row is authoritative for gating. Historical subscriptions
//! are retained for audit and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of subscription durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    SixMonths,
    TwelveMonths,
}

impl BillingPeriod {
    pub fn months(&self) -> u32 {
        match self {
            BillingPeriod::SixMonths => 6,
            BillingPeriod::TwelveMonths => 12,
        }
    }

    pub fn from_months(months: u32) -> Option<Self> {
        match months {
            6 => Some(BillingPeriod::SixMonths),
            12 => Some(BillingPeriod::TwelveMonths),
            _ => None,
        }
    }
}

/// Subscription lifecycle status.
///
/// `Active`, `Rejected`, and `Expired` are terminal except for the
/// time-driven `Active → Expired` lapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    AwaitingPayment,
    AwaitingVerification,
    Active,
    Rejected,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::AwaitingPayment => "awaiting_payment",
            SubscriptionStatus::AwaitingVerification => "awaiting_verification",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Rejected => "rejected",
            SubscriptionStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "awaiting_payment" => Some(SubscriptionStatus::AwaitingPayment),
            "awaiting_verification" => Some(SubscriptionStatus::AwaitingVerification),
            "active" => Some(SubscriptionStatus::Active),
            "rejected" => Some(SubscriptionStatus::Rejected),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    /// True while the subscription still awaits payment or review.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::AwaitingPayment | SubscriptionStatus::AwaitingVerification
        )
    }
}

/// A tenant's subscription to a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plan_id: Uuid,
    pub duration: BillingPeriod,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    /// `start_date + duration`; an `Active` subscription past this
    /// instant must be treated as not-current on every gating read.
    pub end_date: DateTime<Utc>,
    /// Set once the payment proof has been uploaded.
    pub proof_url: Option<String>,
    /// Payment-matching memo stamped on proof submission.
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// True when an `Active` subscription has run past its end date.
    /// There is no background scheduler, so lapse is detected on read.
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date < now
    }

    /// Status with the time-driven lapse folded in.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        if self.is_lapsed(now) {
            SubscriptionStatus::Expired
        } else {
            self.status
        }
    }
}

/// Fields required to open a new subscription in `AwaitingPayment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub tenant_id: Uuid,
    pub plan_id: Uuid,
    pub duration: BillingPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sub(status: SubscriptionStatus, end_offset_days: i64) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            duration: BillingPeriod::SixMonths,
            status,
            start_date: now - Duration::days(180),
            end_date: now + Duration::days(end_offset_days),
            proof_url: None,
            reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_past_end_date_is_lapsed() {
        let s = sub(SubscriptionStatus::Active, -1);
        assert!(s.is_lapsed(Utc::now()));
        assert_eq!(s.effective_status(Utc::now()), SubscriptionStatus::Expired);
    }

    #[test]
    fn active_within_window_is_not_lapsed() {
        let s = sub(SubscriptionStatus::Active, 30);
        assert!(!s.is_lapsed(Utc::now()));
        assert_eq!(s.effective_status(Utc::now()), SubscriptionStatus::Active);
    }

    #[test]
    fn lapse_only_applies_to_active() {
        let s = sub(SubscriptionStatus::AwaitingVerification, -1);
        assert!(!s.is_lapsed(Utc::now()));
        assert_eq!(
            s.effective_status(Utc::now()),
            SubscriptionStatus::AwaitingVerification
        );
    }

    #[test]
    fn billing_period_months_round_trip() {
        assert_eq!(BillingPeriod::from_months(6), Some(BillingPeriod::SixMonths));
        assert_eq!(
            BillingPeriod::from_months(12),
            Some(BillingPeriod::TwelveMonths)
        );
        assert_eq!(BillingPeriod::from_months(3), None);
        assert_eq!(BillingPeriod::SixMonths.months(), 6);
    }
}
