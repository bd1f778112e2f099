use anyhow::{Context, Result};

use qmemory::analysis::types::{AnalysisResult, Candidate, MemoryInput};
use qmemory::config::QMemoryConfig;
use qmemory::locator::Locator;

/// Analyze one memory from the terminal and print the ranked places.
pub async fn analyze(config: &QMemoryConfig, memory: &str, emotion: &str, json: bool) -> Result<()> {
    let input = MemoryInput::submit(memory, emotion)?;
    let locator = Locator::from_config(config)?;

    let result = locator.locate(&input).await?;

    if json {
        let out = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{out}");
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!("Resolved via {}\n", result.source_method);

    print_candidate(1, &result.primary);
    if !result.primary.description.is_empty() {
        println!("     {}", result.primary.description);
    }
    println!();

    for (i, candidate) in result.secondary.iter().enumerate() {
        print_candidate(i + 2, candidate);
    }
}

fn print_candidate(rank: usize, candidate: &Candidate) {
    let region = if candidate.region.is_empty() {
        String::new()
    } else {
        format!(" ({})", candidate.region)
    };
    println!(
        "  {}. {}{} {:.2}%",
        rank, candidate.name, region, candidate.probability
    );
    if let Some(coords) = candidate.coordinates {
        println!("     at {:.4}, {:.4}", coords.lat, coords.lng);
    }
    if let Some(image) = &candidate.image_url {
        println!("     image: {image}");
    }
}
