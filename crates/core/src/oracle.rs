use crate::error::OrganizeError;
use chrono::{NaiveDateTime, Timelike};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub const CREATE_DATE_FIELD: &str = "CreateDate";
pub const MAKE_FIELD: &str = "Make";

pub trait MetadataOracle {
    fn resolve_timestamp(&self, path: &Path) -> Result<NaiveDateTime, OrganizeError>;
    fn resolve_make(&self, path: &Path) -> Result<String, OrganizeError>;
}

#[derive(Debug, Clone)]
pub struct ExifToolOracle {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Default for ExifToolOracle {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExifToolOracle {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    #[cfg(test)]
    fn via_shell(script: &Path) -> Self {
        Self {
            program: OsString::from("sh"),
            leading_args: vec![script.as_os_str().to_os_string()],
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    pub fn check_available(&self) -> Result<String, OrganizeError> {
        let missing = |reason: String| OrganizeError::MissingDependency {
            tool: self.program_name(),
            reason,
        };

        let output = self
            .command()
            .arg("-ver")
            .output()
            .map_err(|err| missing(err.to_string()))?;
        if !output.status.success() {
            return Err(missing(format!("終了コード {}", output.status)));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(tool = %self.program_name(), %version, "外部ツールを確認しました");
        Ok(version)
    }

    pub fn query_field(&self, path: &Path, field: &str) -> Result<String, OrganizeError> {
        let output = self
            .command()
            .arg("-s")
            .arg(format!("-{field}"))
            .arg(path)
            .output()
            .map_err(|err| OrganizeError::metadata_unavailable(path, describe_spawn_error(&err)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OrganizeError::metadata_unavailable(
                path,
                format!("{} 終了コード {}: {}", field, output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_field_output(&stdout, field).ok_or_else(|| {
            OrganizeError::metadata_unavailable(path, format!("{field} がありません"))
        })
    }
}

impl MetadataOracle for ExifToolOracle {
    fn resolve_timestamp(&self, path: &Path) -> Result<NaiveDateTime, OrganizeError> {
        let raw = self.query_field(path, CREATE_DATE_FIELD)?;
        parse_create_date(&raw).ok_or_else(|| OrganizeError::TimestampUnparsable {
            path: path.to_path_buf(),
            value: raw,
        })
    }

    fn resolve_make(&self, path: &Path) -> Result<String, OrganizeError> {
        self.query_field(path, MAKE_FIELD)
    }
}

fn describe_spawn_error(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "外部ツールが見つかりません".to_string(),
        _ => err.to_string(),
    }
}

pub fn parse_field_output(output: &str, field: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case(field) {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Parses `YYYY:MM:DD HH:MM:SS`, ignoring everything after the first `-` and any
/// sub-second part.
pub fn parse_create_date(raw: &str) -> Option<NaiveDateTime> {
    let head = raw.split('-').next()?.trim();

    for fmt in ["%Y:%m:%d %H:%M:%S", "%Y:%m:%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(head, fmt) {
            return parsed.with_nanosecond(0);
        }
    }

    None
}
