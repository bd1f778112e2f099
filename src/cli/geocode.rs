use anyhow::Result;

use qmemory::config::QMemoryConfig;
use qmemory::locator::Locator;

/// Geocode a single place name from the terminal.
pub async fn geocode(config: &QMemoryConfig, name: &str, region: Option<&str>) -> Result<()> {
    let locator = Locator::from_config(config)?;

    match locator.enricher().locate(name, region.unwrap_or("")).await {
        Some(point) => {
            println!("{name}");
            println!("  lat/lng: {:.6}, {:.6}", point.lat, point.lng);
            println!("  address: {}", point.display_address);
            if let Some(country) = &point.country {
                println!("  country: {country}");
            }
        }
        None => println!("No coordinates found for {name:?}."),
    }

    Ok(())
}
