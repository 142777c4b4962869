use chrono::Duration;

use funnelforge_core::{Event, EventName, PlanType, Subscription, SubscriptionStatus};

use crate::draws::DrawSource;
use crate::errors::GenerationError;
use crate::funnel::DelayRange;

/// Flat monthly price attached to every generated subscription.
pub const MONTHLY_REVENUE: f64 = 49.0;

/// Churn parameters for the subscription ledger.
///
/// Churn is drawn independently of any `cancel` event in the stream; a user
/// can hold an active subscription and still have a cancel event. That
/// decoupling is deliberate and preserved for comparability across runs.
#[derive(Debug, Clone)]
pub struct ChurnConfig {
    pub churn_rate: f64,
    pub churned_duration: DelayRange,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            churn_rate: 0.2,
            churned_duration: DelayRange::days(30, 120),
        }
    }
}

impl ChurnConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(0.0..=1.0).contains(&self.churn_rate) {
            return Err(GenerationError::InvalidConfig(format!(
                "churn probability {} is outside [0, 1]",
                self.churn_rate
            )));
        }
        if self.churned_duration.min_days < 0
            || self.churned_duration.min_days > self.churned_duration.max_days
        {
            return Err(GenerationError::InvalidConfig(format!(
                "churn duration range [{}, {}] is not a valid non-negative range",
                self.churned_duration.min_days, self.churned_duration.max_days
            )));
        }
        Ok(())
    }
}

/// Derive one ledger row per upgrade event, in event order.
pub fn derive_subscriptions(
    events: &[Event],
    config: &ChurnConfig,
    draws: &mut impl DrawSource,
) -> Vec<Subscription> {
    let mut subscriptions = Vec::new();
    for event in events {
        if event.name != EventName::Upgrade {
            continue;
        }
        let subscription_id = draws.uuid();
        let churned = draws.chance(config.churn_rate);
        let ended_at = churned.then(|| {
            let duration = draws.int_between(
                config.churned_duration.min_days,
                config.churned_duration.max_days,
            );
            event.occurred_at + Duration::days(duration)
        });
        subscriptions.push(Subscription {
            subscription_id,
            user_id: event.user_id,
            plan: PlanType::Pro,
            started_at: event.occurred_at,
            ended_at,
            monthly_revenue: MONTHLY_REVENUE,
            status: if churned {
                SubscriptionStatus::Canceled
            } else {
                SubscriptionStatus::Active
            },
        });
    }
    subscriptions
}
