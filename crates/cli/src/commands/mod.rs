//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;
pub mod update;

use secrecy::SecretString;
use sqlx::PgPool;

use homegrid_storefront::store::postgres::create_pool;

/// Resolve the storefront database URL from the environment.
///
/// # Errors
///
/// Returns an error when neither `HOMEGRID_DATABASE_URL` nor
/// `DATABASE_URL` is set.
pub fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    std::env::var("HOMEGRID_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "HOMEGRID_DATABASE_URL not set".into())
}

/// Connect to the storefront database.
///
/// # Errors
///
/// Returns an error if the URL is missing or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let url = database_url()?;
    Ok(create_pool(&url).await?)
}
