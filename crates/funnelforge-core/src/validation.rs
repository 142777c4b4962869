use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::entities::{Dataset, EventName, ExperimentVariant};
use crate::error::{Error, Result};

/// Validate the invariants of a generated dataset.
///
/// This checks:
/// - every event and subscription references a known user
/// - per-user event instants are non-decreasing in emission order, starting
///   with a signup at exactly the user's signup instant
/// - the experiment variant is stable across all of a user's events
/// - subscription cardinality equals upgrade-event cardinality
///
/// Any violation is a defect in the generator, not a recoverable condition;
/// callers abort the run without writing output.
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    let users: HashMap<Uuid, _> = dataset
        .users
        .iter()
        .map(|user| (user.user_id, user))
        .collect();

    let mut last_seen: HashMap<Uuid, chrono::NaiveDateTime> = HashMap::new();
    let mut variants: HashMap<Uuid, ExperimentVariant> = HashMap::new();
    let mut seen_event_ids: HashSet<Uuid> = HashSet::new();
    let mut upgrades = 0_u64;

    for event in &dataset.events {
        let user = users.get(&event.user_id).ok_or_else(|| {
            Error::InvalidDataset(format!(
                "event {} references unknown user {}",
                event.event_id, event.user_id
            ))
        })?;

        if !seen_event_ids.insert(event.event_id) {
            return Err(Error::InvalidDataset(format!(
                "duplicate event id: {}",
                event.event_id
            )));
        }

        match last_seen.get(&event.user_id) {
            None => {
                if event.name != EventName::Signup {
                    return Err(Error::InvalidDataset(format!(
                        "first event for user {} is '{}', expected 'signup'",
                        event.user_id,
                        event.name.as_str()
                    )));
                }
                if event.occurred_at != user.signup_at {
                    return Err(Error::InvalidDataset(format!(
                        "signup event for user {} at {} does not match signup instant {}",
                        event.user_id, event.occurred_at, user.signup_at
                    )));
                }
            }
            Some(previous) => {
                if event.occurred_at < *previous {
                    return Err(Error::InvalidDataset(format!(
                        "event instants for user {} regress: {} after {}",
                        event.user_id, event.occurred_at, previous
                    )));
                }
            }
        }
        last_seen.insert(event.user_id, event.occurred_at);

        if let Some(variant) = event.experiment_variant {
            match variants.get(&event.user_id) {
                None => {
                    variants.insert(event.user_id, variant);
                }
                Some(assigned) if *assigned != variant => {
                    return Err(Error::InvalidDataset(format!(
                        "experiment variant for user {} changed from {} to {}",
                        event.user_id,
                        assigned.as_str(),
                        variant.as_str()
                    )));
                }
                Some(_) => {}
            }
        }

        if event.name == EventName::Upgrade {
            upgrades += 1;
        }
    }

    for subscription in &dataset.subscriptions {
        if !users.contains_key(&subscription.user_id) {
            return Err(Error::InvalidDataset(format!(
                "subscription {} references unknown user {}",
                subscription.subscription_id, subscription.user_id
            )));
        }
    }

    if dataset.subscriptions.len() as u64 != upgrades {
        return Err(Error::InvalidDataset(format!(
            "subscription count {} does not match upgrade event count {}",
            dataset.subscriptions.len(),
            upgrades
        )));
    }

    Ok(())
}
