//! Administrative accounts: idempotent seeding and secret-free reads.
//!
//! Authentication itself lives outside this system; the table exists so
//! first-run initialization can seed a default account and so exports can
//! include accounts without their secret fields.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use docuvault_common::{Error, Result};

use crate::db::Database;

/// An administrative account as exposed to exports.
///
/// The password and security-answer hashes are not fields of this type, so
/// no export path can leak them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: i64,
    pub username: String,
    pub security_question: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Access to the administrative account table.
#[derive(Clone)]
pub struct AdminDirectory {
    db: Arc<Database>,
}

impl AdminDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Seed the default account if the table is empty.
    ///
    /// Idempotent: a populated table is left untouched. Must run to
    /// completion before the service accepts traffic; with two instances
    /// starting concurrently against a shared store both may observe an
    /// empty table (accepted for single-instance deployment).
    ///
    /// Returns whether an account was created.
    pub fn ensure_default(&self, username: &str, password: &str) -> Result<bool> {
        if self.count()? > 0 {
            debug!("Admin account already present; skipping seed");
            return Ok(false);
        }

        let password_hash = hash_secret(password)?;
        let now = Utc::now();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO admins (username, password_hash, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![username, password_hash, now, now],
            )
        })?;

        info!(username, "Default admin account created");
        Ok(true)
    }

    pub fn count(&self) -> Result<i64> {
        self.db
            .with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM admins", [], |r| r.get(0)))
    }

    /// All accounts, minus secret fields.
    pub fn list_public(&self) -> Result<Vec<AdminSummary>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, security_question, created_at, updated_at \
                 FROM admins ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(AdminSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    security_question: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?;
            rows.collect()
        })
    }
}

fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {e}")))?
        .to_string())
}
