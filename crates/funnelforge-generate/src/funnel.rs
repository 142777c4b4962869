use chrono::{Duration, NaiveDateTime};

use funnelforge_core::{
    CancelReason, DeviceType, Event, EventName, EventProperties, ExperimentVariant, PlanType, User,
};

use crate::draws::DrawSource;
use crate::errors::GenerationError;

/// Inclusive day-delay bounds applied to the per-user clock when a stage fires.
#[derive(Debug, Clone, Copy)]
pub struct DelayRange {
    pub min_days: i64,
    pub max_days: i64,
}

impl DelayRange {
    pub const fn days(min_days: i64, max_days: i64) -> Self {
        Self { min_days, max_days }
    }

    fn draw(&self, draws: &mut impl DrawSource) -> Duration {
        Duration::days(draws.int_between(self.min_days, self.max_days))
    }

    fn validate(&self, stage: &str) -> Result<(), GenerationError> {
        if self.min_days < 0 || self.min_days > self.max_days {
            return Err(GenerationError::InvalidConfig(format!(
                "{stage} delay range [{}, {}] is not a valid non-negative range",
                self.min_days, self.max_days
            )));
        }
        Ok(())
    }
}

/// Probability branch for a stage: which rate applies depends on whether the
/// user activated during onboarding.
#[derive(Debug, Clone, Copy)]
pub struct StageOdds {
    pub activated: f64,
    pub baseline: f64,
}

impl StageOdds {
    fn rate(&self, activated: bool) -> f64 {
        if activated { self.activated } else { self.baseline }
    }

    fn validate(&self, stage: &str) -> Result<(), GenerationError> {
        for rate in [self.activated, self.baseline] {
            check_probability(rate, stage)?;
        }
        Ok(())
    }
}

/// Transition table for the per-user lifecycle funnel.
///
/// Stage order is fixed (signup, onboarding, feature a, feature b, upgrade,
/// cancel) and every stage is evaluated regardless of earlier outcomes; only
/// the probability branch changes with activation. The defaults are the
/// canonical simulation constants and changing them changes the statistical
/// shape of every run.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    /// Onboarding success probability for experiment variant A.
    pub onboarding_rate_variant_a: f64,
    /// Onboarding success probability for experiment variant B.
    pub onboarding_rate_variant_b: f64,
    pub onboarding_delay: DelayRange,
    pub feature_odds: StageOdds,
    pub feature_delay: DelayRange,
    pub upgrade_odds: StageOdds,
    pub upgrade_delay: DelayRange,
    /// Cancel probability, independent of activation and upgrade outcomes.
    pub cancel_rate: f64,
    pub cancel_delay: DelayRange,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            onboarding_rate_variant_a: 0.55,
            onboarding_rate_variant_b: 0.65,
            onboarding_delay: DelayRange::days(0, 3),
            feature_odds: StageOdds {
                activated: 0.4,
                baseline: 0.1,
            },
            feature_delay: DelayRange::days(1, 14),
            upgrade_odds: StageOdds {
                activated: 0.25,
                baseline: 0.05,
            },
            upgrade_delay: DelayRange::days(7, 30),
            cancel_rate: 0.1,
            cancel_delay: DelayRange::days(30, 90),
        }
    }
}

impl FunnelConfig {
    /// Reject out-of-range probabilities and inverted delay ranges before any
    /// generation begins.
    pub fn validate(&self) -> Result<(), GenerationError> {
        check_probability(self.onboarding_rate_variant_a, "onboarding (variant A)")?;
        check_probability(self.onboarding_rate_variant_b, "onboarding (variant B)")?;
        check_probability(self.cancel_rate, "cancel")?;
        self.feature_odds.validate("feature usage")?;
        self.upgrade_odds.validate("upgrade")?;
        self.onboarding_delay.validate("onboarding")?;
        self.feature_delay.validate("feature usage")?;
        self.upgrade_delay.validate("upgrade")?;
        self.cancel_delay.validate("cancel")?;
        Ok(())
    }

    fn onboarding_rate(&self, variant: ExperimentVariant) -> f64 {
        match variant {
            ExperimentVariant::A => self.onboarding_rate_variant_a,
            ExperimentVariant::B => self.onboarding_rate_variant_b,
        }
    }
}

fn check_probability(value: f64, stage: &str) -> Result<(), GenerationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GenerationError::InvalidConfig(format!(
            "{stage} probability {value} is outside [0, 1]"
        )));
    }
    Ok(())
}

/// Walk one user through the funnel and emit their lifecycle events.
///
/// The per-user clock starts at the signup instant and only ever advances, so
/// event instants are non-decreasing in emission order. The experiment variant
/// is drawn once and reused for every event of this user.
pub fn run_funnel(
    user: &User,
    config: &FunnelConfig,
    draws: &mut impl DrawSource,
) -> Vec<Event> {
    let variant = *draws.pick(&ExperimentVariant::ALL);
    let mut clock = user.signup_at;
    let mut events = Vec::new();

    events.push(emit(
        user,
        draws,
        EventName::Signup,
        clock,
        Some(PlanType::Free),
        Some(variant),
        EventProperties::Signup {
            source: user.acquisition_channel,
            country: user.country,
        },
    ));

    let activated = draws.chance(config.onboarding_rate(variant));
    if activated {
        clock += config.onboarding_delay.draw(draws);
        // The onboarding row carries neither plan nor variant in the export.
        events.push(emit(
            user,
            draws,
            EventName::OnboardingCompleted,
            clock,
            None,
            None,
            EventProperties::Onboarding { steps_completed: 5 },
        ));
    }

    for feature in [EventName::FeatureAUsed, EventName::FeatureBUsed] {
        if draws.chance(config.feature_odds.rate(activated)) {
            clock += config.feature_delay.draw(draws);
            let usage_count = draws.int_between(1, 10) as u32;
            events.push(emit(
                user,
                draws,
                feature,
                clock,
                Some(PlanType::Free),
                Some(variant),
                EventProperties::FeatureUsage { usage_count },
            ));
        }
    }

    if draws.chance(config.upgrade_odds.rate(activated)) {
        clock += config.upgrade_delay.draw(draws);
        events.push(emit(
            user,
            draws,
            EventName::Upgrade,
            clock,
            Some(PlanType::Pro),
            Some(variant),
            EventProperties::Upgrade {
                from_plan: PlanType::Free,
                to_plan: PlanType::Pro,
            },
        ));
    }

    if draws.chance(config.cancel_rate) {
        clock += config.cancel_delay.draw(draws);
        let reason = *draws.pick(&CancelReason::ALL);
        events.push(emit(
            user,
            draws,
            EventName::Cancel,
            clock,
            Some(PlanType::Pro),
            Some(variant),
            EventProperties::Cancel { reason },
        ));
    }

    events
}

#[allow(clippy::too_many_arguments)]
fn emit(
    user: &User,
    draws: &mut impl DrawSource,
    name: EventName,
    occurred_at: NaiveDateTime,
    plan_type: Option<PlanType>,
    experiment_variant: Option<ExperimentVariant>,
    properties: EventProperties,
) -> Event {
    Event {
        event_id: draws.uuid(),
        user_id: user.user_id,
        name,
        occurred_at,
        device_type: *draws.pick(&DeviceType::ALL),
        plan_type,
        experiment_variant,
        properties,
    }
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use funnelforge_core::{AcquisitionChannel, Country};
    use uuid::Uuid;

    use super::testing::ForcedDraws;
    use super::*;
    use crate::draws::SeededDraws;

    fn test_user() -> User {
        User {
            user_id: Uuid::from_u128(7),
            signup_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .expect("valid date")
                .and_hms_opt(0, 0, 0)
                .expect("valid time"),
            acquisition_channel: AcquisitionChannel::Referral,
            country: Country::Ca,
        }
    }

    #[test]
    fn full_funnel_emits_six_events_in_fixed_order() {
        let user = test_user();
        let mut draws = ForcedDraws::new(true);
        let events = run_funnel(&user, &FunnelConfig::default(), &mut draws);

        let names: Vec<EventName> = events.iter().map(|event| event.name).collect();
        assert_eq!(
            names,
            vec![
                EventName::Signup,
                EventName::OnboardingCompleted,
                EventName::FeatureAUsed,
                EventName::FeatureBUsed,
                EventName::Upgrade,
                EventName::Cancel,
            ]
        );
    }

    #[test]
    fn failed_draws_leave_only_the_signup() {
        let user = test_user();
        let mut draws = ForcedDraws::new(false);
        let events = run_funnel(&user, &FunnelConfig::default(), &mut draws);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, EventName::Signup);
        assert_eq!(events[0].occurred_at, user.signup_at);
    }

    #[test]
    fn signup_carries_channel_and_country() {
        let user = test_user();
        let mut draws = ForcedDraws::new(false);
        let events = run_funnel(&user, &FunnelConfig::default(), &mut draws);

        assert_eq!(
            events[0].properties,
            EventProperties::Signup {
                source: AcquisitionChannel::Referral,
                country: Country::Ca,
            }
        );
        assert_eq!(events[0].plan_type, Some(PlanType::Free));
    }

    #[test]
    fn clock_accumulates_monotonically() {
        let user = test_user();
        let mut draws = ForcedDraws::new(true);
        let events = run_funnel(&user, &FunnelConfig::default(), &mut draws);

        assert_eq!(events[0].occurred_at, user.signup_at);
        for pair in events.windows(2) {
            assert!(pair[1].occurred_at >= pair[0].occurred_at);
        }
    }

    #[test]
    fn variant_is_stable_across_all_carrying_events() {
        let user = test_user();
        let mut draws = ForcedDraws::new(true);
        let events = run_funnel(&user, &FunnelConfig::default(), &mut draws);

        let variants: Vec<ExperimentVariant> = events
            .iter()
            .filter_map(|event| event.experiment_variant)
            .collect();
        assert!(!variants.is_empty());
        assert!(variants.iter().all(|variant| *variant == variants[0]));
    }

    #[test]
    fn onboarding_event_has_no_plan_or_variant() {
        let user = test_user();
        let mut draws = ForcedDraws::new(true);
        let events = run_funnel(&user, &FunnelConfig::default(), &mut draws);

        let onboarding = events
            .iter()
            .find(|event| event.name == EventName::OnboardingCompleted)
            .expect("onboarding event");
        assert_eq!(onboarding.plan_type, None);
        assert_eq!(onboarding.experiment_variant, None);
        assert_eq!(
            onboarding.properties,
            EventProperties::Onboarding { steps_completed: 5 }
        );
    }

    #[test]
    fn seeded_run_is_reproducible() {
        let user = test_user();
        let config = FunnelConfig::default();
        let mut a = SeededDraws::from_seed(9);
        let mut b = SeededDraws::from_seed(9);

        let events_a = run_funnel(&user, &config, &mut a);
        let events_b = run_funnel(&user, &config, &mut b);
        assert_eq!(events_a.len(), events_b.len());
        for (left, right) in events_a.iter().zip(&events_b) {
            assert_eq!(left.event_id, right.event_id);
            assert_eq!(left.name, right.name);
            assert_eq!(left.occurred_at, right.occurred_at);
        }
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let mut config = FunnelConfig::default();
        config.cancel_rate = 1.5;
        let err = config.validate().expect_err("probability out of range");
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn validate_rejects_inverted_delay_range() {
        let mut config = FunnelConfig::default();
        config.upgrade_delay = DelayRange::days(30, 7);
        assert!(config.validate().is_err());
    }
}
