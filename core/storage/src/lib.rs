//! File vault for docuvault.
//!
//! This module provides the filesystem abstraction under which uploaded
//! member documents live: one flat directory of stored files, addressed by
//! paths relative to the vault root.
//!
//! # Design Principles
//! - Record isolation: the vault knows nothing about member or document
//!   records; it stores, reads, and deletes bytes.
//! - Validation before write: a rejected upload never leaves partial state.
//! - Streaming reads: file content is handed out in bounded chunks.

pub mod vault;

pub use vault::{ByteStream, FileVault, ALLOWED_FILE_TYPES, MAX_UPLOAD_BYTES};
