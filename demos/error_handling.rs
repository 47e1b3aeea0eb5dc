//! Error handling example for psgc-rs
//!
//! This example demonstrates the failure modes of ingestion, loading and lookup

use psgc_rs::prelude::*;

fn main() -> Result<()> {
    println!("=== PSGC-RS Error Handling Example ===\n");

    // Example 1: Missing source file
    println!("--- Example 1: Missing datafile ---");
    match psgc_rs::loader::parse("files/csv/psgc_1900.csv") {
        Ok(records) => println!("  Unexpectedly parsed {} records", records.len()),
        Err(e @ PsgcError::Io { .. }) => println!("  I/O error: {e}"),
        Err(e) => return Err(e),
    }
    println!();

    // Example 2: Malformed CSV
    println!("--- Example 2: Malformed rows ---");
    let broken = "10-digit PSGC,Name,Correspondence Code,Geographic Level\n\
                  0100000000,Region I,010000000,Reg\n\
                  0102800000,Ilocos Norte\n";
    match psgc_rs::loader::parse_reader(broken.as_bytes()) {
        Ok(_) => println!("  Unexpectedly parsed"),
        Err(e) => println!("  {e}"),
    }
    let headerless = "code,name\n0100000000,Region I\n";
    if let Err(e) = psgc_rs::loader::parse_reader(headerless.as_bytes()) {
        println!("  {e}");
    }
    println!();

    // Example 3: Lookup misses are values, not crashes
    println!("--- Example 3: Unknown codes ---");
    let catalog = Catalog::open_in_memory()?;
    let records = vec![GeographicRecord::new("1300000000", "NCR", "130000000", "Reg")];
    load(&records, &catalog, &LoadOptions::default())?;
    for code in ["1300000000", "9900000000", ""] {
        match catalog.regions().get_by_code(code) {
            Ok(region) => println!("  Found: {} ({})", region.name, region.code),
            Err(e) if e.is_not_found() => println!("  Not found: {code:?}"),
            Err(e) => return Err(e),
        }
    }
    match catalog.provinces().get_by_code("1300000000") {
        Ok(_) => println!("  NCR is not a province"),
        Err(e) => println!("  {e}"),
    }
    println!();

    // Example 4: Cancelling a load
    println!("--- Example 4: Cancelled load ---");
    let token = CancelToken::new();
    token.cancel();
    let report = load(
        &records,
        &catalog,
        &LoadOptions::default().with_reset(true).with_cancel(token),
    )?;
    println!(
        "  cancelled={} written={} complete={}",
        report.cancelled,
        report.written,
        report.is_complete()
    );

    Ok(())
}
