//! Record store for docuvault.
//!
//! This module provides:
//! - The embedded SQLite database holding all records
//! - The member registry (identity attributes)
//! - The document store (member-to-file associations and cascade deletes)
//! - The administrative account table and its idempotent seeding
//!
//! # Architecture
//! The record store sits between the HTTP surface and the file vault. The
//! document store owns the cascade-delete policy: record rows are always
//! removed, file deletions are best-effort and reported, never propagated.

pub mod admin;
pub mod db;
pub mod document;
pub mod member;

pub use admin::{AdminDirectory, AdminSummary};
pub use db::Database;
pub use document::{CascadeReport, DocumentRecord, DocumentRemoval, DocumentStore};
pub use member::{MemberAttrs, MemberRecord, MemberRegistry};
