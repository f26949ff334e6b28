use crate::error::OrganizeError;
use crate::planner::RenamePlan;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFailureReport {
    pub from: PathBuf,
    pub to: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyResult {
    pub applied: usize,
    pub failed: Vec<RenameFailureReport>,
}

// An existing file at the target name is replaced wherever the platform's
// `rename` does so.
pub fn apply_plan(plan: &RenamePlan) -> Result<ApplyResult> {
    let mut result = ApplyResult::default();
    if plan.candidates.is_empty() {
        return Ok(result);
    }

    fs::create_dir_all(&plan.destination_dir).with_context(|| {
        format!(
            "出力フォルダを作成できませんでした: {}",
            plan.destination_dir.display()
        )
    })?;

    for candidate in &plan.candidates {
        match fs::rename(&candidate.original_path, &candidate.target_path) {
            Ok(()) => {
                result.applied += 1;
                info!(
                    from = %candidate.original_path.display(),
                    to = %candidate.target_name,
                    "リネームしました"
                );
            }
            Err(source) => {
                let reason = source.to_string();
                let err = OrganizeError::RenameFailure {
                    from: candidate.original_path.clone(),
                    to: candidate.target_path.clone(),
                    source,
                };
                error!(error = %err, reason = %reason, "リネームに失敗しました");
                result.failed.push(RenameFailureReport {
                    from: candidate.original_path.clone(),
                    to: candidate.target_path.clone(),
                    reason,
                });
            }
        }
    }

    Ok(result)
}
