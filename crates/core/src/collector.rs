use crate::camera::CameraMap;
use crate::error::OrganizeError;
use crate::metadata::{PhotoRecord, SequenceToken};
use crate::oracle::MetadataOracle;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "cr2", "cr3", "raf", "arw"];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]+").expect("static pattern"));

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub scanned_files: usize,
    pub photo_files: usize,
    pub skipped_non_photo: usize,
    pub skipped_hidden: usize,
    pub failed: usize,
    pub collected: usize,
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<PhotoRecord>,
    pub stats: CollectStats,
}

pub fn collect_records(
    source_dir: &Path,
    cameras: &CameraMap,
    oracle: &dyn MetadataOracle,
) -> Result<Collection> {
    let mut stats = CollectStats::default();
    let mut records = Vec::new();

    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("フォルダを読めませんでした: {}", source_dir.display()))?;
        let path = entry.path();
        // Follows symlinks, so a link to a photo is collected like the photo itself.
        if !path.is_file() {
            continue;
        }
        stats.scanned_files += 1;

        if is_hidden(path) {
            stats.skipped_hidden += 1;
            continue;
        }
        if !is_photo(path) {
            stats.skipped_non_photo += 1;
            continue;
        }
        stats.photo_files += 1;

        match read_record(path, cameras, oracle) {
            Ok(record) => {
                debug!(
                    file = %record.file_name,
                    camera_code = %record.camera_code,
                    capture = %record.capture_timestamp,
                    "メタデータを取得しました"
                );
                records.push(record);
            }
            Err(err) => {
                stats.failed += 1;
                error!(file = %path.display(), error = %err, "ファイルの処理に失敗しました");
            }
        }
    }

    stats.collected = records.len();
    Ok(Collection { records, stats })
}

pub fn read_record(
    path: &Path,
    cameras: &CameraMap,
    oracle: &dyn MetadataOracle,
) -> Result<PhotoRecord, OrganizeError> {
    let file_name = path
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .ok_or_else(|| OrganizeError::metadata_unavailable(path, "ファイル名がありません"))?;

    let capture_timestamp = oracle.resolve_timestamp(path)?;

    let camera_make = match oracle.resolve_make(path) {
        Ok(make) => Some(make),
        Err(err) => {
            warn!(file = %file_name, error = %err, "Makeを取得できないため Unknown として扱います");
            None
        }
    };
    let camera_code = cameras.resolve(camera_make.as_deref()).to_string();

    let file_extension = path
        .extension()
        .map(|v| format!(".{}", v.to_string_lossy()))
        .unwrap_or_default();

    let original_sequence_token = path
        .file_stem()
        .and_then(|stem| sequence_token_from_name(&stem.to_string_lossy()));

    Ok(PhotoRecord {
        source_path: path.to_path_buf(),
        file_name,
        capture_timestamp,
        file_extension,
        camera_make,
        camera_code,
        original_sequence_token,
    })
}

pub fn sequence_token_from_name(name: &str) -> Option<SequenceToken> {
    DIGIT_RUN
        .find(name)
        .and_then(|m| SequenceToken::new(m.as_str()))
}

pub fn is_photo(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            PHOTO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
