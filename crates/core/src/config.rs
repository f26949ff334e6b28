use crate::camera::{CameraMap, CameraMapping};
use crate::metadata::DuplicateRule;
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "TMJ";
pub const DEFAULT_DESTINATION_NAME: &str = "Organize_Photos";
pub const DEFAULT_LOG_NAME: &str = "renaming.log";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataBackend {
    #[default]
    Exiftool,
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_dir: PathBuf,
    pub destination_dir: Option<PathBuf>,
    pub prefix: String,
    pub duplicate_rule: DuplicateRule,
    pub metadata_backend: MetadataBackend,
    pub exiftool_path: String,
    pub log_file: Option<PathBuf>,
    pub cameras: Vec<CameraMapping>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            destination_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
            duplicate_rule: DuplicateRule::default(),
            metadata_backend: MetadataBackend::default(),
            exiftool_path: "exiftool".to_string(),
            log_file: None,
            cameras: vec![
                CameraMapping::new("Canon", "CANON"),
                CameraMapping::new("FUJIFILM", "FUJI"),
                CameraMapping::new("SONY", "IR"),
            ],
        }
    }
}

impl AppConfig {
    pub fn destination_dir(&self) -> PathBuf {
        self.destination_dir
            .clone()
            .unwrap_or_else(|| self.source_dir.join(DEFAULT_DESTINATION_NAME))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.source_dir.join(DEFAULT_LOG_NAME))
    }

    pub fn camera_map(&self) -> CameraMap {
        CameraMap::new(self.cameras.clone())
    }

    pub fn validate(&self) -> Result<()> {
        validate_name_part("prefix", &self.prefix)?;
        for camera in &self.cameras {
            if camera.make.trim().is_empty() {
                bail!("カメラのMakeが空です (code = {})", camera.code);
            }
            validate_name_part("camera code", &camera.code)?;
        }
        Ok(())
    }
}

fn validate_name_part(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{label} が空です");
    }
    if let Some(ch) = value.chars().find(|&ch| is_disallowed_char(ch)) {
        bail!("{label} にファイル名で使えない文字が含まれています: {value:?} ({ch:?})");
    }
    Ok(())
}

fn is_disallowed_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ch.is_control()
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "tmj", "photo-organizer")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("設定ファイルを読めませんでした: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw).context("設定ファイルのパースに失敗しました")?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "設定ディレクトリを作成できませんでした: {}",
            paths.config_dir.display()
        )
    })?;
    save_config_to(config, &paths.config_path)?;
    Ok(paths.config_path)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let body = toml::to_string_pretty(config).context("設定のシリアライズに失敗しました")?;
    fs::write(path, body)
        .with_context(|| format!("設定ファイルを書き込めませんでした: {}", path.display()))?;
    Ok(())
}
