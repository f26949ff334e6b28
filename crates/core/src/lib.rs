mod apply;
mod camera;
mod collector;
mod config;
mod error;
mod exif_reader;
mod metadata;
mod oracle;
mod planner;
mod sequencer;

pub use apply::{apply_plan, ApplyResult, RenameFailureReport};
pub use camera::{CameraMap, CameraMapping, UNKNOWN_CAMERA_CODE};
pub use collector::{collect_records, read_record, CollectStats, Collection, PHOTO_EXTENSIONS};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
    MetadataBackend,
};
pub use error::OrganizeError;
pub use exif_reader::NativeExifOracle;
pub use metadata::{Discriminator, DuplicateRule, PhotoRecord, SequenceToken};
pub use oracle::{parse_create_date, parse_field_output, ExifToolOracle, MetadataOracle};
pub use planner::{generate_plan, PlanOptions, RenamePlan, RenameStats};
pub use sequencer::{
    assign_sequence, format_target_name, sort_records, RenameCandidate, SequenceOptions,
};
