//! Core contracts for Funnelforge.
//!
//! This crate defines the canonical entity types produced by the generator
//! (users, lifecycle events, subscriptions), the dataset container, and the
//! invariant validation shared across crates.

pub mod entities;
pub mod error;
pub mod validation;

pub use entities::{
    AcquisitionChannel, CancelReason, Country, Dataset, DeviceType, Event, EventName,
    EventProperties, ExperimentVariant, PlanType, Subscription, SubscriptionStatus, User,
};
pub use error::{Error, Result};
pub use validation::validate_dataset;
