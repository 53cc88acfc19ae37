//! File-backed optimizer model persistence
//!
//! The model is one JSON document. Saves go to a sibling temp file that is
//! then renamed over the target, so readers never see a half-written model.

use crate::error::{EngineError, EngineResult};
use crate::traits::ModelStore;
use async_trait::async_trait;
use shared::{process_debug, process_warn, OptimizerModelState, ProcessId, MODEL_VERSION};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "model.json".into());
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, message: impl std::fmt::Display) -> EngineError {
        EngineError::Persistence {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ModelStore for FileModelStore {
    async fn load(&self) -> OptimizerModelState {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                process_debug!(ProcessId::current(), "📂 No optimizer model at {}, starting fresh", self.path.display());
                return OptimizerModelState::default();
            }
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Could not read optimizer model {}: {}", self.path.display(), e);
                return OptimizerModelState::default();
            }
        };

        match serde_json::from_str::<OptimizerModelState>(&text) {
            Ok(state) if state.version == MODEL_VERSION => state,
            Ok(state) => {
                process_warn!(
                    ProcessId::current(),
                    "⚠️ Discarding optimizer model version {} (expected {})",
                    state.version,
                    MODEL_VERSION
                );
                OptimizerModelState::default()
            }
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Corrupt optimizer model {}: {}", self.path.display(), e);
                OptimizerModelState::default()
            }
        }
    }

    async fn save(&self, state: &OptimizerModelState) -> EngineResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persistence_error(e))?;
        }

        let json = serde_json::to_vec_pretty(state)?;
        let temp = self.temp_path();
        fs::write(&temp, json).await.map_err(|e| self.persistence_error(e))?;

        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(self.persistence_error(e));
        }

        process_debug!(ProcessId::current(), "💾 Saved optimizer model (run {})", state.runs);
        Ok(())
    }
}
