use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Digit run taken from the original file name, e.g. `0042` from `IMG_0042.CR2`.
///
/// Ordered by numeric value so `IMG_9` sorts before `IMG_10`; leading zeros only
/// break ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceToken(String);

impl SequenceToken {
    pub fn new(digits: impl Into<String>) -> Option<Self> {
        let digits = digits.into();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn significant(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() {
            "0"
        } else {
            trimmed
        }
    }
}

impl Ord for SequenceToken {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for SequenceToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateRule {
    #[default]
    SequenceToken,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminator<'a> {
    Token(&'a SequenceToken),
    Timestamp(NaiveDateTime),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub source_path: PathBuf,
    pub file_name: String,
    pub capture_timestamp: NaiveDateTime,
    pub file_extension: String,
    pub camera_make: Option<String>,
    pub camera_code: String,
    pub original_sequence_token: Option<SequenceToken>,
}

impl PhotoRecord {
    pub fn capture_date(&self) -> NaiveDate {
        self.capture_timestamp.date()
    }

    pub fn normalized_camera_make(&self) -> Option<&str> {
        self.camera_make
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn discriminator(&self, rule: DuplicateRule) -> Discriminator<'_> {
        match (rule, self.original_sequence_token.as_ref()) {
            (DuplicateRule::SequenceToken, Some(token)) => Discriminator::Token(token),
            _ => Discriminator::Timestamp(self.capture_timestamp),
        }
    }
}
