//! Catalog maintenance command.
//!
//! Same job runner the admin endpoints call, for operators who prefer a
//! shell to an HTTP request.

use homegrid_storefront::config::JobSettings;
use homegrid_storefront::jobs::{JobRunner, UpdateKind};
use homegrid_storefront::store::PgStore;

/// Run a maintenance pass and print the report as JSON.
///
/// # Errors
///
/// Returns an error for an unknown update type or an unreachable database.
/// Per-step failures are reported, not fatal; the process exits nonzero
/// when any step failed.
pub async fn run(update_type: &str, simulate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let kind: UpdateKind = update_type
        .parse()
        .map_err(|e: String| -> Box<dyn std::error::Error> { e.into() })?;

    let pool = super::connect().await?;
    let store = PgStore::new(pool);

    let report = JobRunner::new(&store, JobSettings { simulate })
        .run(kind)
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.succeeded() {
        return Err(format!("{} step(s) failed", report.errors.len()).into());
    }
    Ok(())
}
