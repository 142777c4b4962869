//! Seeded event-log generator for Funnelforge.
//!
//! This crate fabricates a user population, walks each user through a fixed
//! lifecycle funnel to produce a time-ordered event stream, derives a
//! subscription ledger from the upgrade events, and exports the three tables
//! as CSV.

pub mod draws;
pub mod engine;
pub mod errors;
pub mod funnel;
pub mod model;
pub mod output;
pub mod population;
pub mod subscriptions;

pub use draws::{DrawSource, SeededDraws};
pub use engine::{GenerationEngine, GenerationResult, generate_dataset};
pub use errors::GenerationError;
pub use funnel::FunnelConfig;
pub use model::{GenerateOptions, GenerationReport};
pub use subscriptions::ChurnConfig;
