//! Shared application state (spec §6).

use std::{collections::HashMap, sync::Arc};

use crate::{config::SharedConfig, document::DocumentKind, prelude::*, scanner::Scanner};

/// DI-constructed scanners, keyed by document kind, plus the config
/// they were built from. Built once at startup by
/// [`crate::factory::create_scanner`]; request handlers never
/// construct a scanner themselves.
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    scanners: Arc<HashMap<DocumentKind, Arc<dyn Scanner>>>,
}

impl AppState {
    /// Wire up one scanner per document kind from `config` (spec §4.7).
    pub fn new(config: SharedConfig) -> Result<Self> {
        let mut scanners: HashMap<DocumentKind, Arc<dyn Scanner>> = HashMap::new();
        for kind in [DocumentKind::Check, DocumentKind::Receipt] {
            let scanner: Arc<dyn Scanner> = Arc::from(crate::factory::create_scanner(kind, &config)?);
            scanners.insert(kind, scanner);
        }
        Ok(Self {
            config,
            scanners: Arc::new(scanners),
        })
    }

    pub fn scanner(&self, kind: DocumentKind) -> &Arc<dyn Scanner> {
        self.scanners
            .get(&kind)
            .expect("a scanner is wired for every DocumentKind variant at construction time")
    }

    /// Build an [`AppState`] from already-constructed scanners, bypassing
    /// [`crate::factory::create_scanner`]. Used by integration tests to
    /// wire in stub drivers; never called from `main`.
    #[doc(hidden)]
    pub fn with_scanners(check: Arc<dyn Scanner>, receipt: Arc<dyn Scanner>) -> Self {
        let mut scanners: HashMap<DocumentKind, Arc<dyn Scanner>> = HashMap::new();
        scanners.insert(DocumentKind::Check, check);
        scanners.insert(DocumentKind::Receipt, receipt);
        Self {
            config: Arc::new(crate::config::Config::test_default()),
            scanners: Arc::new(scanners),
        }
    }
}
