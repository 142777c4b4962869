use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel through which a user was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionChannel {
    Organic,
    PaidSearch,
    Referral,
    Sales,
}

impl AcquisitionChannel {
    pub const ALL: [AcquisitionChannel; 4] = [
        AcquisitionChannel::Organic,
        AcquisitionChannel::PaidSearch,
        AcquisitionChannel::Referral,
        AcquisitionChannel::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionChannel::Organic => "organic",
            AcquisitionChannel::PaidSearch => "paid_search",
            AcquisitionChannel::Referral => "referral",
            AcquisitionChannel::Sales => "sales",
        }
    }
}

/// Country codes covered by the simulated population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    Us,
    Ca,
    Gb,
    De,
    In,
}

impl Country {
    pub const ALL: [Country; 5] = [
        Country::Us,
        Country::Ca,
        Country::Gb,
        Country::De,
        Country::In,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Us => "US",
            Country::Ca => "CA",
            Country::Gb => "GB",
            Country::De => "DE",
            Country::In => "IN",
        }
    }
}

/// Fixed lifecycle funnel event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    Signup,
    OnboardingCompleted,
    FeatureAUsed,
    FeatureBUsed,
    Upgrade,
    Cancel,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Signup => "signup",
            EventName::OnboardingCompleted => "onboarding_completed",
            EventName::FeatureAUsed => "feature_a_used",
            EventName::FeatureBUsed => "feature_b_used",
            EventName::Upgrade => "upgrade",
            EventName::Cancel => "cancel",
        }
    }
}

/// Device an event was recorded on, drawn independently per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Web,
    Mobile,
}

impl DeviceType {
    pub const ALL: [DeviceType; 2] = [DeviceType::Web, DeviceType::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Web => "web",
            DeviceType::Mobile => "mobile",
        }
    }
}

/// Billing plan attached to an event or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Free,
    Pro,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::Pro => "pro",
        }
    }
}

/// Experiment arm, assigned once per user and stable across their events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentVariant {
    A,
    B,
}

impl ExperimentVariant {
    pub const ALL: [ExperimentVariant; 2] = [ExperimentVariant::A, ExperimentVariant::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentVariant::A => "A",
            ExperimentVariant::B => "B",
        }
    }
}

/// Stated reason attached to a cancel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Price,
    Value,
    Other,
}

impl CancelReason {
    pub const ALL: [CancelReason; 3] =
        [CancelReason::Price, CancelReason::Value, CancelReason::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            CancelReason::Price => "price",
            CancelReason::Value => "value",
            CancelReason::Other => "other",
        }
    }
}

/// Whether a derived subscription churned at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

/// A member of the simulated population. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub signup_at: NaiveDateTime,
    pub acquisition_channel: AcquisitionChannel,
    pub country: Country,
}

/// Structured payload carried by an event; the shape depends on the event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventProperties {
    Signup {
        source: AcquisitionChannel,
        country: Country,
    },
    Onboarding {
        steps_completed: u32,
    },
    FeatureUsage {
        usage_count: u32,
    },
    Upgrade {
        from_plan: PlanType,
        to_plan: PlanType,
    },
    Cancel {
        reason: CancelReason,
    },
}

/// One lifecycle event emitted by the funnel sequencer. Append-only.
///
/// `plan_type` and `experiment_variant` are absent on onboarding events, which
/// carry neither field in the exported table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub name: EventName,
    pub occurred_at: NaiveDateTime,
    pub device_type: DeviceType,
    pub plan_type: Option<PlanType>,
    pub experiment_variant: Option<ExperimentVariant>,
    pub properties: EventProperties,
}

/// Ledger row derived from a single upgrade event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub subscription_id: Uuid,
    pub user_id: Uuid,
    pub plan: PlanType,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub monthly_revenue: f64,
    pub status: SubscriptionStatus,
}

/// The three entity sets produced by one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub subscriptions: Vec<Subscription>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_properties_serialize_as_flat_object() {
        let props = EventProperties::Signup {
            source: AcquisitionChannel::PaidSearch,
            country: Country::De,
        };
        let json = serde_json::to_string(&props).expect("serialize");
        assert_eq!(json, r#"{"source":"paid_search","country":"DE"}"#);
    }

    #[test]
    fn cancel_properties_carry_reason() {
        let props = EventProperties::Cancel {
            reason: CancelReason::Price,
        };
        let json = serde_json::to_string(&props).expect("serialize");
        assert_eq!(json, r#"{"reason":"price"}"#);
    }

    #[test]
    fn enum_strings_match_export_values() {
        assert_eq!(AcquisitionChannel::PaidSearch.as_str(), "paid_search");
        assert_eq!(Country::Gb.as_str(), "GB");
        assert_eq!(EventName::OnboardingCompleted.as_str(), "onboarding_completed");
        assert_eq!(ExperimentVariant::B.as_str(), "B");
        assert_eq!(SubscriptionStatus::Canceled.as_str(), "canceled");
    }
}
