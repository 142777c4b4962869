//! Generate the three tables with default settings into ./out.
//!
//! Run with: `cargo run -p funnelforge-generate --example generate_tables`

use funnelforge_generate::{GenerateOptions, GenerationEngine};

fn main() {
    let engine = GenerationEngine::new(GenerateOptions::default());
    match engine.run() {
        Ok(result) => {
            println!("wrote {} events to {}",
                result.report.events_generated,
                result.run_dir.display()
            );
        }
        Err(err) => {
            eprintln!("generation failed: {err}");
            std::process::exit(1);
        }
    }
}
