use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("メタデータを取得できませんでした: {path} ({reason})")]
    MetadataUnavailable { path: PathBuf, reason: String },
    #[error("撮影日時を解析できませんでした: {path} ({value:?})")]
    TimestampUnparsable { path: PathBuf, value: String },
    #[error("リネームに失敗しました: {from} -> {to}")]
    RenameFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("必要な外部ツールが見つかりません: {tool} ({reason})")]
    MissingDependency { tool: String, reason: String },
}

impl OrganizeError {
    pub fn metadata_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MetadataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }
}
