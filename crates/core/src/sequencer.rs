use crate::metadata::{Discriminator, DuplicateRule, PhotoRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub target_name: String,
    pub camera_code: String,
    pub capture_date: NaiveDate,
    pub sequence_number: u32,
    pub duplicate_of_previous: bool,
}

#[derive(Debug, Clone)]
pub struct SequenceOptions {
    pub prefix: String,
    pub destination_dir: PathBuf,
    pub duplicate_rule: DuplicateRule,
}

pub fn format_target_name(
    prefix: &str,
    capture_date: NaiveDate,
    camera_code: &str,
    sequence_number: u32,
    extension: &str,
) -> String {
    format!(
        "{}_{}_{}_{:04}{}",
        prefix,
        capture_date.format("%y%m%d"),
        camera_code,
        sequence_number,
        extension
    )
}

pub fn compare_records(a: &PhotoRecord, b: &PhotoRecord) -> Ordering {
    a.capture_timestamp
        .cmp(&b.capture_timestamp)
        .then_with(|| a.original_sequence_token.cmp(&b.original_sequence_token))
        .then_with(|| a.file_name.cmp(&b.file_name))
        .then_with(|| a.source_path.cmp(&b.source_path))
}

pub fn sort_records(records: &[PhotoRecord]) -> Vec<&PhotoRecord> {
    let mut sorted: Vec<&PhotoRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare_records(a, b));
    sorted
}

/// Numbers every record whose camera code is listed, one independent pass per code
/// in the order given. Output follows pass order, then capture order.
pub fn assign_sequence(
    records: &[PhotoRecord],
    camera_codes: &[String],
    options: &SequenceOptions,
) -> Vec<RenameCandidate> {
    let sorted = sort_records(records);
    let mut out = Vec::with_capacity(records.len());

    for code in camera_codes {
        let pass = sorted
            .iter()
            .copied()
            .filter(|record| &record.camera_code == code)
            .scan(PassState::new(), |state, record| {
                let (number, duplicate) = state.advance(record, options.duplicate_rule);
                Some(build_candidate(record, number, duplicate, options))
            });
        out.extend(pass);
    }

    out
}

fn build_candidate(
    record: &PhotoRecord,
    sequence_number: u32,
    duplicate_of_previous: bool,
    options: &SequenceOptions,
) -> RenameCandidate {
    let capture_date = record.capture_date();
    let target_name = format_target_name(
        &options.prefix,
        capture_date,
        &record.camera_code,
        sequence_number,
        &record.file_extension,
    );
    RenameCandidate {
        original_path: record.source_path.clone(),
        target_path: join_target(&options.destination_dir, &target_name),
        target_name,
        camera_code: record.camera_code.clone(),
        capture_date,
        sequence_number,
        duplicate_of_previous,
    }
}

fn join_target(destination_dir: &Path, name: &str) -> PathBuf {
    destination_dir.join(name)
}

#[derive(Debug)]
struct PassState<'a> {
    date: Option<NaiveDate>,
    next: u32,
    previous: Option<(Discriminator<'a>, u32)>,
}

impl<'a> PassState<'a> {
    fn new() -> Self {
        Self {
            date: None,
            next: 1,
            previous: None,
        }
    }

    fn advance(&mut self, record: &'a PhotoRecord, rule: DuplicateRule) -> (u32, bool) {
        let date = record.capture_date();
        if self.date != Some(date) {
            self.date = Some(date);
            self.next = 1;
            self.previous = None;
        }

        let discriminator = record.discriminator(rule);
        let (number, duplicate) = match self.previous {
            Some((prev, number)) if prev == discriminator => (number, true),
            _ => {
                let number = self.next;
                self.next += 1;
                (number, false)
            }
        };

        self.previous = Some((discriminator, number));
        (number, duplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::{assign_sequence, format_target_name, sort_records, SequenceOptions};
    use crate::camera::UNKNOWN_CAMERA_CODE;
    use crate::collector::sequence_token_from_name;
    use crate::metadata::{DuplicateRule, PhotoRecord};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;

    fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .and_then(|d| d.and_hms_opt(time.0, time.1, time.2))
            .expect("valid timestamp")
    }

    fn record(name: &str, code: &str, ts: NaiveDateTime) -> PhotoRecord {
        let path = PathBuf::from("/import").join(name);
        PhotoRecord {
            file_extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
            original_sequence_token: path
                .file_stem()
                .and_then(|s| sequence_token_from_name(&s.to_string_lossy())),
            source_path: path,
            file_name: name.to_string(),
            capture_timestamp: ts,
            camera_make: None,
            camera_code: code.to_string(),
        }
    }

    fn options(rule: DuplicateRule) -> SequenceOptions {
        SequenceOptions {
            prefix: "TMJ".to_string(),
            destination_dir: PathBuf::from("/out"),
            duplicate_rule: rule,
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    fn names(records: &[PhotoRecord], list: &[&str], rule: DuplicateRule) -> Vec<String> {
        assign_sequence(records, &codes(list), &options(rule))
            .into_iter()
            .map(|c| c.target_name)
            .collect()
    }

    #[test]
    fn format_target_name_pads_to_four_digits() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
        assert_eq!(
            format_target_name("TMJ", date, "CANON", 7, ".CR2"),
            "TMJ_240615_CANON_0007.CR2"
        );
        assert_eq!(
            format_target_name("TMJ", date, "IR", 12345, ".ARW"),
            "TMJ_240615_IR_12345.ARW"
        );
    }

    #[test]
    fn distinct_timestamps_get_consecutive_numbers() {
        let records = vec![
            record("IMG_0002.CR2", "CANON", at((2024, 6, 15), (10, 0, 5))),
            record("IMG_0001.CR2", "CANON", at((2024, 6, 15), (10, 0, 0))),
        ];
        assert_eq!(
            names(&records, &["CANON"], DuplicateRule::SequenceToken),
            vec!["TMJ_240615_CANON_0001.CR2", "TMJ_240615_CANON_0002.CR2"]
        );
    }

    #[test]
    fn identical_timestamp_shares_number() {
        let ts = at((2024, 6, 15), (10, 0, 0));

        let raw_and_jpeg = vec![
            record("IMG_0001.JPG", "CANON", ts),
            record("IMG_0001.CR2", "CANON", ts),
        ];
        assert_eq!(
            names(&raw_and_jpeg, &["CANON"], DuplicateRule::SequenceToken),
            vec!["TMJ_240615_CANON_0001.CR2", "TMJ_240615_CANON_0001.JPG"]
        );

        let tokenless = vec![record("sunset.CR2", "CANON", ts), record("sunrise.JPG", "CANON", ts)];
        assert_eq!(
            names(&tokenless, &["CANON"], DuplicateRule::SequenceToken),
            vec!["TMJ_240615_CANON_0001.JPG", "TMJ_240615_CANON_0001.CR2"]
        );

        let burst = vec![
            record("IMG_0001.CR2", "CANON", ts),
            record("IMG_0002.CR2", "CANON", ts),
        ];
        assert_eq!(
            names(&burst, &["CANON"], DuplicateRule::Timestamp),
            vec!["TMJ_240615_CANON_0001.CR2", "TMJ_240615_CANON_0001.CR2"]
        );
        assert_eq!(
            names(&burst, &["CANON"], DuplicateRule::SequenceToken),
            vec!["TMJ_240615_CANON_0001.CR2", "TMJ_240615_CANON_0002.CR2"]
        );
    }

    #[test]
    fn duplicates_do_not_break_contiguity() {
        let records = vec![
            record("IMG_0001.JPG", "CANON", at((2024, 6, 15), (9, 0, 0))),
            record("IMG_0001.CR2", "CANON", at((2024, 6, 15), (9, 0, 0))),
            record("IMG_0002.CR2", "CANON", at((2024, 6, 15), (9, 5, 0))),
            record("IMG_0003.CR2", "CANON", at((2024, 6, 15), (9, 6, 0))),
            record("IMG_0003.JPG", "CANON", at((2024, 6, 15), (9, 6, 0))),
            record("IMG_0004.CR2", "CANON", at((2024, 6, 15), (9, 7, 0))),
        ];
        let plan = assign_sequence(&records, &codes(&["CANON"]), &options(DuplicateRule::SequenceToken));
        let numbers: Vec<u32> = plan.iter().map(|c| c.sequence_number).collect();
        let duplicates: Vec<bool> = plan.iter().map(|c| c.duplicate_of_previous).collect();

        assert_eq!(numbers, vec![1, 1, 2, 3, 3, 4]);
        assert_eq!(duplicates, vec![false, true, false, false, true, false]);
    }

    #[test]
    fn numbering_resets_on_each_new_day() {
        let records = vec![
            record("IMG_0010.CR2", "CANON", at((2024, 6, 16), (8, 0, 0))),
            record("IMG_0008.CR2", "CANON", at((2024, 6, 15), (22, 0, 0))),
            record("IMG_0009.CR2", "CANON", at((2024, 6, 15), (23, 59, 59))),
            record("IMG_0011.CR2", "CANON", at((2024, 6, 16), (8, 1, 0))),
            record("IMG_0012.CR2", "CANON", at((2024, 6, 18), (12, 0, 0))),
        ];
        assert_eq!(
            names(&records, &["CANON"], DuplicateRule::SequenceToken),
            vec![
                "TMJ_240615_CANON_0001.CR2",
                "TMJ_240615_CANON_0002.CR2",
                "TMJ_240616_CANON_0001.CR2",
                "TMJ_240616_CANON_0002.CR2",
                "TMJ_240618_CANON_0001.CR2",
            ]
        );
    }

    #[test]
    fn same_token_across_midnight_is_not_a_duplicate() {
        let records = vec![
            record("IMG_0001.JPG", "CANON", at((2024, 6, 15), (23, 59, 59))),
            record("IMG_0001.CR2", "CANON", at((2024, 6, 16), (0, 0, 0))),
        ];
        let plan = assign_sequence(&records, &codes(&["CANON"]), &options(DuplicateRule::SequenceToken));
        assert!(plan.iter().all(|c| c.sequence_number == 1));
        assert!(plan.iter().all(|c| !c.duplicate_of_previous));
    }

    #[test]
    fn cameras_are_numbered_independently_in_pass_order() {
        let records = vec![
            record("IMG_0001.CR2", "CANON", at((2024, 6, 15), (10, 0, 0))),
            record("DSC00001.ARW", "IR", at((2024, 6, 15), (10, 0, 1))),
            record("IMG_0002.CR2", "CANON", at((2024, 6, 15), (10, 0, 2))),
            record("DSCF0001.RAF", "FUJI", at((2024, 6, 15), (10, 0, 3))),
            record("DSC_0001.NEF.JPG", UNKNOWN_CAMERA_CODE, at((2024, 6, 15), (10, 0, 4))),
        ];
        assert_eq!(
            names(
                &records,
                &["CANON", "FUJI", "IR", UNKNOWN_CAMERA_CODE],
                DuplicateRule::SequenceToken
            ),
            vec![
                "TMJ_240615_CANON_0001.CR2",
                "TMJ_240615_CANON_0002.CR2",
                "TMJ_240615_FUJI_0001.RAF",
                "TMJ_240615_IR_0001.ARW",
                "TMJ_240615_Unknown_0001.JPG",
            ]
        );
    }

    #[test]
    fn records_of_unlisted_codes_are_not_planned() {
        let records = vec![record("DSC_0001.JPG", "NIKON", at((2024, 6, 15), (10, 0, 0)))];
        assert!(assign_sequence(&records, &codes(&["CANON"]), &options(DuplicateRule::SequenceToken)).is_empty());
    }

    #[test]
    fn sort_breaks_timestamp_ties_by_token_then_name() {
        let ts = at((2024, 6, 15), (10, 0, 0));
        let records = vec![
            record("IMG_10.JPG", "CANON", ts),
            record("b.JPG", "CANON", ts),
            record("IMG_9.JPG", "CANON", ts),
            record("a.JPG", "CANON", ts),
            record("IMG_9.CR2", "CANON", ts),
        ];
        let order: Vec<&str> = sort_records(&records)
            .into_iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(order, vec!["a.JPG", "b.JPG", "IMG_9.CR2", "IMG_9.JPG", "IMG_10.JPG"]);
    }

    #[test]
    fn target_path_joins_destination_dir() {
        let records = vec![record("IMG_0001.CR2", "CANON", at((2024, 6, 15), (10, 0, 0)))];
        let plan = assign_sequence(&records, &codes(&["CANON"]), &options(DuplicateRule::SequenceToken));
        assert_eq!(
            plan[0].target_path,
            PathBuf::from("/out").join("TMJ_240615_CANON_0001.CR2")
        );
        assert_eq!(plan[0].original_path, PathBuf::from("/import/IMG_0001.CR2"));
    }
}
