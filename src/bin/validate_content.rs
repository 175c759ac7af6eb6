//! Content catalog lint: load and validate `data/scenarios.json` and
//! `data/lessons.json`, print a breakdown, exit non-zero on bad content.
//!
//! Run this after editing catalog files; the server performs the same
//! validation at startup but this gives a faster loop.

use std::collections::BTreeMap;

use pokercoach::content::{ContentCatalog, CHAPTER_ORDER};

fn main() {
    let _base = pokercoach::env_config::init_base_path();

    let catalog = match ContentCatalog::load(std::path::Path::new("data")) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("INVALID: {e}");
            std::process::exit(1);
        }
    };

    println!("Scenarios: {}", catalog.scenarios().len());
    let mut by_difficulty: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_stage: BTreeMap<&str, usize> = BTreeMap::new();
    let mut unscored = 0usize;
    for s in catalog.scenarios() {
        *by_difficulty.entry(s.difficulty.as_str()).or_insert(0) += 1;
        *by_stage.entry(s.stage.as_str()).or_insert(0) += 1;
        if s.ideal_decision.is_none() {
            unscored += 1;
            println!("  WARNING: {} has no ideal decision (cannot be scored)", s.id);
        }
    }
    for (difficulty, count) in &by_difficulty {
        println!("  {:<8} {}", difficulty, count);
    }
    for (stage, count) in &by_stage {
        println!("  {:<8} {}", stage, count);
    }

    println!("Lessons: {}", catalog.lesson_count());
    for chapter in CHAPTER_ORDER {
        let count = catalog
            .lessons()
            .into_iter()
            .filter(|l| l.chapter == chapter)
            .count();
        println!("  {:<40} {}", chapter, count);
    }

    if unscored > 0 {
        println!("{} scenario(s) cannot be scored yet", unscored);
    }
    println!("Content OK");
}
