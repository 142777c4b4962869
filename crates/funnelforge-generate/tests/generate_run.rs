use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use funnelforge_core::EventName;
use funnelforge_generate::{GenerateOptions, GenerationEngine};

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("funnelforge_run_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn options(label: &str, population: u64) -> GenerateOptions {
    GenerateOptions {
        out_dir: temp_out_dir(label),
        population,
        ..GenerateOptions::default()
    }
}

#[test]
fn runs_are_byte_identical_for_a_fixed_seed() {
    let result_a = GenerationEngine::new(options("det_a", 300))
        .run()
        .expect("run generation A");
    let result_b = GenerationEngine::new(options("det_b", 300))
        .run()
        .expect("run generation B");

    for table in ["users.csv", "events.csv", "subscriptions.csv"] {
        let contents_a =
            fs::read_to_string(result_a.run_dir.join(table)).expect("read table A");
        let contents_b =
            fs::read_to_string(result_b.run_dir.join(table)).expect("read table B");
        assert_eq!(contents_a, contents_b, "{table} should be deterministic");
    }
}

#[test]
fn different_seeds_produce_different_events() {
    let result_a = GenerationEngine::new(options("seed_a", 100))
        .run()
        .expect("run generation A");
    let mut other = options("seed_b", 100);
    other.seed = 43;
    let result_b = GenerationEngine::new(other).run().expect("run generation B");

    let events_a = fs::read_to_string(result_a.run_dir.join("events.csv")).expect("read A");
    let events_b = fs::read_to_string(result_b.run_dir.join("events.csv")).expect("read B");
    assert_ne!(events_a, events_b);
}

#[test]
fn every_reference_resolves_to_a_generated_user() {
    let result = GenerationEngine::new(options("refs", 500))
        .run()
        .expect("run generation");

    let users: HashSet<_> = result
        .dataset
        .users
        .iter()
        .map(|user| user.user_id)
        .collect();
    assert_eq!(users.len(), 500);
    for event in &result.dataset.events {
        assert!(users.contains(&event.user_id));
    }
    for subscription in &result.dataset.subscriptions {
        assert!(users.contains(&subscription.user_id));
    }
}

#[test]
fn subscriptions_match_upgrade_events_one_to_one() {
    let result = GenerationEngine::new(options("subs", 500))
        .run()
        .expect("run generation");

    let upgrades = result
        .dataset
        .events
        .iter()
        .filter(|event| event.name == EventName::Upgrade)
        .count();
    assert_eq!(result.dataset.subscriptions.len(), upgrades);
    assert!(upgrades > 0, "expected some upgrades at population 500");
}

#[test]
fn report_row_counts_match_the_tables() {
    let result = GenerationEngine::new(options("report", 200))
        .run()
        .expect("run generation");

    assert_eq!(result.report.users_generated, 200);
    assert_eq!(
        result.report.events_generated,
        result.dataset.events.len() as u64
    );
    assert_eq!(
        result.report.events_by_name.get("signup").copied(),
        Some(200)
    );

    let report_json = fs::read_to_string(result.run_dir.join("generation_report.json"))
        .expect("read generation_report.json");
    let report: serde_json::Value = serde_json::from_str(&report_json).expect("parse report");
    assert_eq!(
        report.get("users_generated").and_then(|v| v.as_u64()),
        Some(200)
    );

    let users_csv = fs::read_to_string(result.run_dir.join("users.csv")).expect("read users.csv");
    // Header plus one line per user.
    assert_eq!(users_csv.lines().count(), 201);
}

#[test]
fn invalid_probability_aborts_before_any_output() {
    let options = options("invalid", 10);
    let out_dir = options.out_dir.clone();
    let mut funnel = funnelforge_generate::FunnelConfig::default();
    funnel.upgrade_odds.activated = 1.25;

    let engine = GenerationEngine::with_configs(
        options,
        funnel,
        funnelforge_generate::ChurnConfig::default(),
    );
    let err = engine.run().expect_err("invalid probability");
    assert!(err.to_string().contains("outside [0, 1]"));

    let leftovers = fs::read_dir(&out_dir).expect("list out dir").count();
    assert_eq!(leftovers, 0, "no run directory should be created");
}
