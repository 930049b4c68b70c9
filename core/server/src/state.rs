//! Application state shared across handlers.

use std::sync::Arc;

use docuvault_common::Result;
use docuvault_export::ExportEngine;
use docuvault_records::{AdminDirectory, Database, DocumentStore, MemberRegistry};
use docuvault_report::ReportGenerator;
use docuvault_storage::FileVault;

use crate::config::{ServerConfig, DB_FILENAME, VAULT_DIRNAME};

/// Shared service components, cheap to clone into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: MemberRegistry,
    pub documents: DocumentStore,
    pub vault: Arc<FileVault>,
    pub exports: ExportEngine,
    pub reports: ReportGenerator,
    pub api_token: Option<String>,
}

impl AppState {
    /// Open the data directory and wire every component up.
    ///
    /// This is the explicit first-run initialization step: schema setup and
    /// default-admin seeding complete before the caller binds a listener.
    pub fn initialize(config: &ServerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db = Arc::new(Database::open(config.data_dir.join(DB_FILENAME))?);
        let vault = Arc::new(FileVault::open(config.data_dir.join(VAULT_DIRNAME))?);

        AdminDirectory::new(db.clone())
            .ensure_default(&config.admin_username, &config.admin_password)?;

        Ok(Self {
            registry: MemberRegistry::new(db.clone()),
            documents: DocumentStore::new(db.clone(), vault.clone()),
            exports: ExportEngine::new(db.clone(), vault.clone()),
            reports: ReportGenerator::new(db, vault.clone()),
            vault,
            api_token: config.api_token.clone(),
        })
    }
}
