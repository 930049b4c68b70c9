//! Member registry: authoritative store of member identity attributes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use docuvault_common::{Error, MemberId, Result};

use crate::db::Database;
use crate::document::{CascadeReport, DocumentStore};

const MEMBER_COLUMNS: &str = "id, custom_id, name, email, address, phone, \
     pan_number, citizenship_number, nid_number, created_at, updated_at";

/// A member identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: MemberId,
    pub custom_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub pan_number: Option<String>,
    pub citizenship_number: Option<String>,
    pub nid_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming member attributes, shared by create and update.
///
/// On update, a field overwrites the stored value only when it carries a
/// non-empty string; `None` and `Some("")` both read as "no change", so an
/// existing value cannot be cleared through this type.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberAttrs {
    pub custom_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub pan_number: Option<String>,
    pub citizenship_number: Option<String>,
    pub nid_number: Option<String>,
}

/// Authoritative store of member records.
#[derive(Clone)]
pub struct MemberRegistry {
    db: Arc<Database>,
}

impl MemberRegistry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a member, persisting the provided optional fields as given.
    pub fn create(&self, attrs: MemberAttrs) -> Result<MemberRecord> {
        let now = Utc::now();
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO members (custom_id, name, email, address, phone, \
                 pan_number, citizenship_number, nid_number, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    attrs.custom_id,
                    attrs.name,
                    attrs.email,
                    attrs.address,
                    attrs.phone,
                    attrs.pan_number,
                    attrs.citizenship_number,
                    attrs.nid_number,
                    now,
                    now,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(member = id, "Member created");
        self.get(MemberId(id))
    }

    /// Fetch one member.
    ///
    /// # Errors
    /// - `NotFound` if no such id.
    pub fn get(&self, id: MemberId) -> Result<MemberRecord> {
        let found = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"))?;
            match stmt.query_row([id.as_i64()], member_from_row) {
                Ok(m) => Ok(Some(m)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })?;

        found.ok_or_else(|| Error::NotFound(format!("Member not found: {id}")))
    }

    /// All members, most recently created first.
    pub fn list(&self) -> Result<Vec<MemberRecord>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], member_from_row)?;
            rows.collect()
        })
    }

    /// Apply a partial update.
    ///
    /// Only fields carrying a non-empty value overwrite the stored record;
    /// everything else is left untouched.
    ///
    /// # Errors
    /// - `NotFound` if no such id.
    pub fn update(&self, id: MemberId, attrs: MemberAttrs) -> Result<MemberRecord> {
        let mut member = self.get(id)?;

        apply_truthy(&mut member.custom_id, attrs.custom_id);
        apply_truthy(&mut member.name, attrs.name);
        apply_truthy(&mut member.email, attrs.email);
        apply_truthy(&mut member.address, attrs.address);
        apply_truthy(&mut member.phone, attrs.phone);
        apply_truthy(&mut member.pan_number, attrs.pan_number);
        apply_truthy(&mut member.citizenship_number, attrs.citizenship_number);
        apply_truthy(&mut member.nid_number, attrs.nid_number);

        let now = Utc::now();
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE members SET custom_id = ?1, name = ?2, email = ?3, \
                 address = ?4, phone = ?5, pan_number = ?6, citizenship_number = ?7, \
                 nid_number = ?8, updated_at = ?9 WHERE id = ?10",
                params![
                    member.custom_id,
                    member.name,
                    member.email,
                    member.address,
                    member.phone,
                    member.pan_number,
                    member.citizenship_number,
                    member.nid_number,
                    now,
                    id.as_i64(),
                ],
            )
        })?;

        debug!(member = %id, "Member updated");
        self.get(id)
    }

    /// Delete a member, cascading to all owned documents and their files.
    ///
    /// The document store removes every owned record even when individual
    /// file deletions fail; those failures come back in the report.
    ///
    /// # Errors
    /// - `NotFound` if no such id.
    pub async fn delete(&self, id: MemberId, documents: &DocumentStore) -> Result<CascadeReport> {
        // Referential check up front so an unknown id is a clean NotFound.
        self.get(id)?;

        let report = documents.delete_all_for_member(id).await?;

        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM members WHERE id = ?1", [id.as_i64()])
        })?;

        info!(
            member = %id,
            documents = report.documents_removed,
            failed_files = report.failed_files.len(),
            "Member deleted"
        );
        Ok(report)
    }
}

fn apply_truthy(slot: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming {
        if !value.is_empty() {
            *slot = Some(value);
        }
    }
}

pub(crate) fn member_from_row(row: &Row<'_>) -> rusqlite::Result<MemberRecord> {
    Ok(MemberRecord {
        id: MemberId(row.get(0)?),
        custom_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        phone: row.get(5)?,
        pan_number: row.get(6)?,
        citizenship_number: row.get(7)?,
        nid_number: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MemberRegistry {
        MemberRegistry::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_create_fills_defaults() {
        let registry = registry();
        let member = registry
            .create(MemberAttrs {
                name: Some("Asha".to_string()),
                email: Some("a@x.com".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert!(member.id.as_i64() > 0);
        assert_eq!(member.name.as_deref(), Some("Asha"));
        assert_eq!(member.email.as_deref(), Some("a@x.com"));
        assert!(member.custom_id.is_none());
        assert!(member.phone.is_none());
        assert!(member.pan_number.is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let registry = registry();
        let first = registry.create(MemberAttrs::default()).unwrap();
        let second = registry.create(MemberAttrs::default()).unwrap();

        let listed = registry.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let registry = registry();
        assert!(registry.get(MemberId(99)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_overwrites_truthy_fields() {
        let registry = registry();
        let member = registry
            .create(MemberAttrs {
                name: Some("Asha".to_string()),
                ..Default::default()
            })
            .unwrap();

        let updated = registry
            .update(
                member.id,
                MemberAttrs {
                    phone: Some("555-0101".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Asha"));
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));
    }

    #[test]
    fn test_update_empty_string_is_no_change() {
        // An empty field is indistinguishable from "not provided": the
        // stored value survives.
        let registry = registry();
        let member = registry
            .create(MemberAttrs {
                name: Some("Asha".to_string()),
                email: Some("a@x.com".to_string()),
                ..Default::default()
            })
            .unwrap();

        let updated = registry
            .update(
                member.id,
                MemberAttrs {
                    name: Some(String::new()),
                    email: None,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("Asha"));
        assert_eq!(updated.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let registry = registry();
        let err = registry
            .update(MemberId(404), MemberAttrs::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let registry = registry();
        let member = registry
            .create(MemberAttrs {
                pan_number: Some("P123".to_string()),
                ..Default::default()
            })
            .unwrap();

        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["panNumber"], "P123");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("pan_number").is_none());
    }
}
