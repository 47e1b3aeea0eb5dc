//! Basic usage example for psgc-rs
//!
//! This example demonstrates how to:
//! - Parse a PSGC publication CSV
//! - Load it into an SQLite catalog
//! - Page through and filter a level table
//! - Look up single units and their parents

use psgc_rs::prelude::*;

const SAMPLE: &str = include_str!("../crates/psgc-core/tests/fixtures/psgc_sample.csv");

fn main() -> Result<()> {
    println!("=== PSGC-RS Basic Usage Example ===\n");

    // Parse and load
    println!("Loading PSGC sample...");
    let records = psgc_rs::loader::parse_reader(SAMPLE.as_bytes())?;
    let catalog = Catalog::open_in_memory()?;
    let report = load(&records, &catalog, &LoadOptions::default())?;
    println!(
        "✓ {} records written ({} unclassified, {} inconsistent)\n",
        report.written, report.unclassified, report.inconsistent
    );

    // Example 1: List regions
    println!("--- Example 1: List all regions ---");
    let regions = catalog.regions().list(&PaginationParams::default())?;
    for (i, region) in regions.data.iter().enumerate() {
        println!("{}. {} ({})", i + 1, region.name, region.code);
    }
    println!();

    // Example 2: Pagination
    println!("--- Example 2: Page through the masterlist ---");
    let mut page = 1;
    loop {
        let chunk = catalog.masterlist().list(&PaginationParams::new(page, 8, ""))?;
        println!(
            "page {}/{}: {} items",
            chunk.metadata.page, chunk.metadata.total_pages, chunk.metadata.item_count
        );
        if u64::from(page) >= chunk.metadata.total_pages {
            break;
        }
        page += 1;
    }
    println!();

    // Example 3: Filter
    println!("--- Example 3: Barangays matching 'pob' ---");
    let hits = catalog
        .barangays()
        .list(&PaginationParams::default().with_filter("pob"))?;
    for barangay in &hits.data {
        println!("  {} ({}) in {}", barangay.name, barangay.code, barangay.city_muni_code);
    }
    println!();

    // Example 4: Walk up from a barangay
    println!("--- Example 4: Parents of a barangay ---");
    let barangay = catalog.barangays().get_by_code("0102805001")?;
    let town = catalog.city_muni().get_by_code(&barangay.city_muni_code)?;
    let province = catalog.provinces().get_by_code(&town.province_code)?;
    let region = catalog.regions().get_by_code(&province.region_code)?;
    println!(
        "  {} → {} ({}) → {} → {}",
        barangay.name, town.name, town.level, province.name, region.name
    );

    Ok(())
}
