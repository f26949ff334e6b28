use crate::error::OrganizeError;
use crate::oracle::{parse_create_date, MetadataOracle, CREATE_DATE_FIELD, MAKE_FIELD};
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// In-process oracle backed by kamadak-exif. `CreateDate` is EXIF DateTimeDigitized,
/// with DateTimeOriginal as fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExifOracle;

impl MetadataOracle for NativeExifOracle {
    fn resolve_timestamp(&self, path: &Path) -> Result<NaiveDateTime, OrganizeError> {
        let exif = read_exif(path)?;
        let raw = find_ascii_value(&exif, &[Tag::DateTimeDigitized, Tag::DateTimeOriginal])
            .ok_or_else(|| {
                OrganizeError::metadata_unavailable(path, format!("{CREATE_DATE_FIELD} がありません"))
            })?;
        parse_create_date(&raw).ok_or_else(|| OrganizeError::TimestampUnparsable {
            path: path.to_path_buf(),
            value: raw,
        })
    }

    fn resolve_make(&self, path: &Path) -> Result<String, OrganizeError> {
        let exif = read_exif(path)?;
        find_ascii_value(&exif, &[Tag::Make]).ok_or_else(|| {
            OrganizeError::metadata_unavailable(path, format!("{MAKE_FIELD} がありません"))
        })
    }
}

fn read_exif(path: &Path) -> Result<Exif, OrganizeError> {
    let file = File::open(path).map_err(|err| {
        OrganizeError::metadata_unavailable(path, format!("EXIF読み込み対象を開けませんでした: {err}"))
    })?;
    let mut buf = BufReader::new(file);
    Reader::new()
        .read_from_container(&mut buf)
        .map_err(|err| OrganizeError::metadata_unavailable(path, format!("EXIFを解析できませんでした: {err}")))
}

fn find_ascii_value(exif: &Exif, tags: &[Tag]) -> Option<String> {
    tags.iter().find_map(|tag| {
        let field = exif.get_field(*tag, In::PRIMARY)?;
        match &field.value {
            Value::Ascii(values) => values
                .first()
                .map(|v| {
                    String::from_utf8_lossy(v)
                        .trim_end_matches('\0')
                        .trim()
                        .to_string()
                })
                .filter(|v| !v.is_empty()),
            _ => None,
        }
    })
}
