use crate::camera::CameraMap;
use crate::collector::{collect_records, CollectStats};
use crate::metadata::DuplicateRule;
use crate::oracle::MetadataOracle;
use crate::sequencer::{assign_sequence, RenameCandidate, SequenceOptions};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub prefix: String,
    pub cameras: CameraMap,
    pub duplicate_rule: DuplicateRule,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenameStats {
    #[serde(flatten)]
    pub collect: CollectStats,
    pub planned: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub prefix: String,
    pub candidates: Vec<RenameCandidate>,
    pub stats: RenameStats,
}

pub fn generate_plan(options: &PlanOptions, oracle: &dyn MetadataOracle) -> Result<RenamePlan> {
    if !options.source_dir.exists() {
        anyhow::bail!(
            "取り込みフォルダが存在しません: {}",
            options.source_dir.display()
        );
    }

    let collection = collect_records(&options.source_dir, &options.cameras, oracle)?;
    let sequence = SequenceOptions {
        prefix: options.prefix.clone(),
        destination_dir: options.destination_dir.clone(),
        duplicate_rule: options.duplicate_rule,
    };
    let candidates = assign_sequence(
        &collection.records,
        &options.cameras.known_codes(),
        &sequence,
    );

    let stats = RenameStats {
        collect: collection.stats,
        planned: candidates.len(),
        duplicates: candidates.iter().filter(|c| c.duplicate_of_previous).count(),
    };
    info!(
        scanned = stats.collect.scanned_files,
        failed = stats.collect.failed,
        planned = stats.planned,
        "リネーム計画を作成しました"
    );

    Ok(RenamePlan {
        source_dir: options.source_dir.clone(),
        destination_dir: options.destination_dir.clone(),
        prefix: options.prefix.clone(),
        candidates,
        stats,
    })
}
