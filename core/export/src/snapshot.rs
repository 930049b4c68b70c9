//! Point-in-time record snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docuvault_records::{AdminSummary, DocumentRecord, MemberRecord};

/// Every record in the store at one instant, tagged with the export time.
///
/// Administrative accounts appear as [`AdminSummary`], which carries no
/// secret fields by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub export_date: DateTime<Utc>,
    pub members: Vec<MemberRecord>,
    pub documents: Vec<DocumentRecord>,
    pub admins: Vec<AdminSummary>,
}
