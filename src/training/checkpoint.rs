//! 최고 검증 손실 체크포인트 직렬화

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 에폭 단위 체크포인트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: usize,
    pub model_state: Vec<f32>,
    pub optimizer_state: Vec<f32>,
    pub val_loss: f32,
    pub created_at: String,
}

impl Checkpoint {
    pub fn new(epoch: usize, model_state: Vec<f32>, optimizer_state: Vec<f32>, val_loss: f32) -> Self {
        Self {
            epoch,
            model_state,
            optimizer_state,
            val_loss,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self).context("checkpoint serialization failed")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("cannot write checkpoint to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("cannot read checkpoint from {}", path.display()))?;
        bincode::deserialize(&bytes).context("checkpoint deserialization failed")
    }
}
