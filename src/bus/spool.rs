//! Spool directory producer
//!
//! External detectors write JSON arrays of raw signals into a directory. Each
//! scan publishes every pending `*.json` file and removes it.

use super::{SignalBus, SignalProducer};
use crate::market::MarketContext;
use crate::signal::RawSignal;
use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Publishes batches dropped into a spool directory
#[derive(Debug, Clone)]
pub struct SpoolProducer {
    dir: PathBuf,
    universe: HashSet<String>,
}

impl SpoolProducer {
    /// Empty `universe` accepts every symbol
    pub fn new(dir: impl Into<PathBuf>, universe: impl IntoIterator<Item = String>) -> Self {
        Self {
            dir: dir.into(),
            universe: universe.into_iter().map(|s| s.trim().to_uppercase()).collect(),
        }
    }

    fn in_universe(&self, signal: &RawSignal) -> bool {
        if self.universe.is_empty() {
            return true;
        }
        // Symbol-less signals pass through so ingest can count them as malformed
        match signal.symbol.as_deref() {
            Some(symbol) => self.universe.contains(&symbol.trim().to_uppercase()),
            None => true,
        }
    }

    async fn pending_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read spool directory {}", self.dir.display()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read_batch(path: &Path) -> anyhow::Result<Vec<RawSignal>> {
        let content = tokio::fs::read_to_string(path).await?;
        let batch = serde_json::from_str(&content)?;
        Ok(batch)
    }
}

#[async_trait]
impl SignalProducer for SpoolProducer {
    fn name(&self) -> &str {
        "spool"
    }

    async fn scan(&self, _ctx: &MarketContext, bus: &SignalBus) -> anyhow::Result<()> {
        let mut rejected = Vec::new();

        for path in self.pending_files().await? {
            match Self::read_batch(&path).await {
                Ok(batch) => {
                    let total = batch.len();
                    let mut published = 0;
                    for signal in batch.into_iter().filter(|s| self.in_universe(s)) {
                        bus.publish(signal);
                        published += 1;
                    }
                    tracing::debug!(
                        file = %path.display(),
                        total,
                        published,
                        "Consumed spool file"
                    );
                    tokio::fs::remove_file(&path)
                        .await
                        .with_context(|| format!("Failed to remove spool file {}", path.display()))?;
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Rejecting unreadable spool file");
                    tokio::fs::rename(&path, path.with_extension("json.bad")).await?;
                    rejected.push(path.display().to_string());
                }
            }
        }

        if !rejected.is_empty() {
            anyhow::bail!("rejected spool files: {}", rejected.join(", "));
        }
        Ok(())
    }
}
