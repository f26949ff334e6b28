use serde::{Deserialize, Serialize};

pub const UNKNOWN_CAMERA_CODE: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CameraMapping {
    pub make: String,
    pub code: String,
}

impl CameraMapping {
    pub fn new(make: &str, code: &str) -> Self {
        Self {
            make: make.to_string(),
            code: code.to_string(),
        }
    }
}

/// Ordered make -> code table. Declaration order drives the sequencing passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraMap {
    entries: Vec<CameraMapping>,
}

impl CameraMap {
    pub fn new(entries: Vec<CameraMapping>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CameraMapping] {
        &self.entries
    }

    pub fn resolve(&self, make: Option<&str>) -> &str {
        let Some(make) = make.map(str::trim).filter(|m| !m.is_empty()) else {
            return UNKNOWN_CAMERA_CODE;
        };

        self.entries
            .iter()
            .find(|entry| entry.make.trim().eq_ignore_ascii_case(make))
            .map(|entry| entry.code.as_str())
            .unwrap_or(UNKNOWN_CAMERA_CODE)
    }

    pub fn known_codes(&self) -> Vec<String> {
        let mut codes = Vec::<String>::with_capacity(self.entries.len() + 1);
        for entry in &self.entries {
            if !codes.iter().any(|c| c == &entry.code) {
                codes.push(entry.code.clone());
            }
        }
        if !codes.iter().any(|c| c == UNKNOWN_CAMERA_CODE) {
            codes.push(UNKNOWN_CAMERA_CODE.to_string());
        }
        codes
    }
}

impl From<Vec<CameraMapping>> for CameraMap {
    fn from(entries: Vec<CameraMapping>) -> Self {
        Self::new(entries)
    }
}
