// src/models/subscription.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Suspended,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 5] = [
        SubscriptionStatus::Pending,
        SubscriptionStatus::Active,
        SubscriptionStatus::Suspended,
        SubscriptionStatus::Cancelled,
        SubscriptionStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Suspended => "suspended",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    /// Transições permitidas do ciclo de vida.
    /// `cancelled` e `expired` são terminais.
    pub fn can_transition_to(&self, next: SubscriptionStatus) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Pending, Cancelled)
                | (Active, Suspended)
                | (Active, Cancelled)
                | (Active, Expired)
                | (Suspended, Active)
                | (Suspended, Cancelled)
                | (Suspended, Expired)
        )
    }

    /// Estados que podem ser levados a `expired` quando o prazo vence.
    pub fn expirable() -> Vec<SubscriptionStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(SubscriptionStatus::Expired))
            .collect()
    }
}

// ---
// Plan (O "Plano")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    #[schema(example = "Mensal")]
    pub name: String,
    #[schema(value_type = f64, example = 29.9)]
    pub price: Decimal,
    #[schema(example = "monthly")]
    pub duration: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Duração em dias. O campo é um "balde" grosseiro; valores
    /// desconhecidos caem no mensal.
    pub fn duration_days(&self) -> i64 {
        plan_duration_days(&self.duration)
    }
}

pub fn plan_duration_days(duration: &str) -> i64 {
    match duration {
        "monthly" => 30,
        "quarterly" => 90,
        "yearly" => 365,
        _ => 30,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub business_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at > now
    }
}

// Assinatura + dados do plano (o que a API devolve)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionWithPlan {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub subscription: Subscription,
    pub plan_name: String,
    #[schema(value_type = f64)]
    pub plan_price: Decimal,
    pub plan_duration: String,
}

impl SubscriptionWithPlan {
    pub fn new(subscription: Subscription, plan: &Plan) -> Self {
        Self {
            subscription,
            plan_name: plan.name.clone(),
            plan_price: plan.price,
            plan_duration: plan.duration.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateSubscriptionPayload {
    pub business_id: Uuid,
    pub plan_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("monthly", 30)]
    #[case("quarterly", 90)]
    #[case("yearly", 365)]
    #[case("weekly", 30)]
    #[case("", 30)]
    fn duration_buckets(#[case] duration: &str, #[case] days: i64) {
        assert_eq!(plan_duration_days(duration), days);
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for next in SubscriptionStatus::ALL {
            assert!(!SubscriptionStatus::Cancelled.can_transition_to(next));
            assert!(!SubscriptionStatus::Expired.can_transition_to(next));
        }
    }

    #[test]
    fn only_active_and_suspended_can_expire() {
        assert_eq!(
            SubscriptionStatus::expirable(),
            vec![SubscriptionStatus::Active, SubscriptionStatus::Suspended]
        );
    }

    #[test]
    fn pending_activates() {
        assert!(SubscriptionStatus::Pending.can_transition_to(SubscriptionStatus::Active));
        assert!(!SubscriptionStatus::Active.can_transition_to(SubscriptionStatus::Pending));
    }
}
