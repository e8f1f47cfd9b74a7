//! Admin account provisioning command.

use tracing::info;

use homegrid_core::UserRole;
use homegrid_storefront::auth::hash_password;
use homegrid_storefront::store::{PgStore, Store};

/// Create an admin user.
///
/// # Errors
///
/// Returns an error if the email is already taken, hashing fails, or the
/// database is unreachable.
pub async fn create_user(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let store = PgStore::new(pool);

    let hash = hash_password(password)?;
    let user = store.create_user(email, &hash, UserRole::Admin).await?;

    info!(user_id = %user.id, email = %user.email, "Admin user created");
    Ok(())
}
