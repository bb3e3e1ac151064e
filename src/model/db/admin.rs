use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::{Coll, Id};

/// Username of the admin account created at first launch.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
}

impl AdminCore {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // Unwrap safe because the only way to create an AdminCore is via
        // From<AdminCredentials>, so the hash is always well-formed.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap()
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with their unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Ensure that at least one admin account exists, creating the default one
/// with the given password if necessary.
pub async fn ensure_admin_exists(admins: &Coll<NewAdmin>, default_password: &str) -> Result<()> {
    let count = admins.count_documents(None, None).await?;
    if count > 0 {
        return Ok(());
    }

    let credentials = crate::model::api::admin::AdminCredentials {
        username: DEFAULT_ADMIN_USERNAME.to_string(),
        password: default_password.to_string(),
    };
    let admin: NewAdmin = credentials.try_into().map_err(|_| {
        Error::Status(
            rocket::http::Status::InternalServerError,
            "Default admin password does not meet the minimum requirements".to_string(),
        )
    })?;
    admins.insert_one(admin, None).await?;
    warn!("No admin accounts found; created default admin '{DEFAULT_ADMIN_USERNAME}'");

    Ok(())
}
