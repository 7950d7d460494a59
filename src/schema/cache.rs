use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::columns::ColumnSynonyms;
use super::loader::load_with;
use super::types::KpiDefinition;
use crate::table::load_table;

/// Process-wide holder for loaded KPI definitions.
///
/// Definitions are shared read-only through an `Arc`. They are reloaded only
/// when the workbook's modification time changes; a failed reload leaves the
/// previous definitions in place.
pub struct DefinitionCache {
    path: PathBuf,
    sheet: String,
    synonyms: ColumnSynonyms,
    inner: Mutex<Option<CachedDefinitions>>,
}

struct CachedDefinitions {
    modified: Option<SystemTime>,
    definitions: Arc<Vec<KpiDefinition>>,
}

impl DefinitionCache {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>, synonyms: ColumnSynonyms) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            synonyms,
            inner: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current definitions, reloading from disk if the workbook changed.
    pub fn get(&self) -> Result<Arc<Vec<KpiDefinition>>> {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok();

        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("Definition cache lock poisoned"))?;

        if let Some(cached) = guard.as_ref() {
            if modified.is_some() && cached.modified == modified {
                return Ok(Arc::clone(&cached.definitions));
            }
        }

        let table = load_table(&self.path, &self.sheet)?;
        let definitions = load_with(&table, &self.synonyms).with_context(|| {
            format!(
                "Invalid KPI configuration in {} [{}]",
                self.path.display(),
                self.sheet
            )
        })?;

        if guard.is_some() {
            log::info!("Reloaded {} KPI definitions from {}", definitions.len(), self.path.display());
        }

        let definitions = Arc::new(definitions);
        *guard = Some(CachedDefinitions {
            modified,
            definitions: Arc::clone(&definitions),
        });
        Ok(definitions)
    }

    /// Like `get`, but a failed reload is logged and `current` is returned.
    pub fn get_or(&self, current: &Arc<Vec<KpiDefinition>>) -> Arc<Vec<KpiDefinition>> {
        match self.get() {
            Ok(definitions) => definitions,
            Err(e) => {
                log::warn!("{:#}; keeping the previously loaded KPIs", e);
                Arc::clone(current)
            }
        }
    }
}
