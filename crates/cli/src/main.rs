mod logging;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_organizer_core::{
    app_paths, apply_plan, generate_plan, load_config, load_config_from, save_config, AppConfig,
    DuplicateRule, ExifToolOracle, MetadataBackend, MetadataOracle, NativeExifOracle,
    PlanOptions, RenamePlan,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "photo-organizer-cli")]
#[command(about = "EXIFの撮影日時とカメラから写真ファイルを日付・カメラ別の連番でリネームします")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Check(CheckArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(long)]
    source: Option<PathBuf>,
    #[arg(long)]
    destination: Option<PathBuf>,
    #[arg(long)]
    prefix: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    native_exif: bool,
    #[arg(long, value_enum)]
    duplicate_rule: Option<DuplicateRuleArg>,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DuplicateRuleArg {
    SequenceToken,
    Timestamp,
}

impl From<DuplicateRuleArg> for DuplicateRule {
    fn from(value: DuplicateRuleArg) -> Self {
        match value {
            DuplicateRuleArg::SequenceToken => DuplicateRule::SequenceToken,
            DuplicateRuleArg::Timestamp => DuplicateRule::Timestamp,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Check(args) => cmd_check(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show { config } => cmd_config_show(config),
            ConfigAction::Init { force } => cmd_config_init(force),
        },
    }
}

fn resolve_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = rename_config(&args)?;

    logging::init_logging(Some(&config.log_file()))?;

    let oracle = build_oracle(&config)?;
    let options = PlanOptions {
        source_dir: config.source_dir.clone(),
        destination_dir: config.destination_dir(),
        prefix: config.prefix.clone(),
        cameras: config.camera_map(),
        duplicate_rule: config.duplicate_rule,
    };

    let plan = generate_plan(&options, oracle.as_ref())?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Table => {
            print_table(&plan);
        }
    }

    if args.dry_run {
        eprintln!("dry-runモード: 実ファイルは変更していません。");
        return Ok(());
    }

    let result = apply_plan(&plan)?;
    info!(
        applied = result.applied,
        failed = result.failed.len(),
        "リネーム処理が完了しました"
    );
    eprintln!(
        "適用完了: {}件 (失敗 {}件, メタデータ取得失敗 {}件)",
        result.applied,
        result.failed.len(),
        plan.stats.collect.failed
    );
    for failure in &result.failed {
        eprintln!(
            "  失敗: {} -> {} ({})",
            failure.from.display(),
            failure.to.display(),
            failure.reason
        );
    }

    Ok(())
}

fn rename_config(args: &RenameArgs) -> Result<AppConfig> {
    let mut config = resolve_config(args.config.as_ref())?;
    if let Some(source) = &args.source {
        config.source_dir = source.clone();
    }
    if let Some(destination) = &args.destination {
        config.destination_dir = Some(destination.clone());
    }
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = Some(log_file.clone());
    }
    if let Some(rule) = args.duplicate_rule {
        config.duplicate_rule = rule.into();
    }
    if args.native_exif {
        config.metadata_backend = MetadataBackend::Native;
    }
    config.validate()?;

    // Must run before logging, which creates the log file's parent directory.
    if !config.source_dir.is_dir() {
        bail!(
            "取り込みフォルダが存在しません: {}",
            config.source_dir.display()
        );
    }

    Ok(config)
}

fn build_oracle(config: &AppConfig) -> Result<Box<dyn MetadataOracle>> {
    match config.metadata_backend {
        MetadataBackend::Native => Ok(Box::new(NativeExifOracle)),
        MetadataBackend::Exiftool => {
            let tool = ExifToolOracle::new(&config.exiftool_path);
            match tool.check_available() {
                Ok(version) => {
                    info!(tool = %tool.program_name(), %version, "exiftoolを使用します");
                    Ok(Box::new(tool))
                }
                Err(err) => {
                    error!(error = %err, "依存ツールが不足しているため中止します");
                    Err(err.into())
                }
            }
        }
    }
}

fn cmd_check(args: CheckArgs) -> Result<()> {
    let config = resolve_config(args.config.as_ref())?;
    logging::init_logging(None)?;

    if config.metadata_backend == MetadataBackend::Native {
        println!("metadata_backend = native: 外部ツールは不要です");
        return Ok(());
    }

    let version = ExifToolOracle::new(&config.exiftool_path).check_available()?;
    println!("{}: {}", config.exiftool_path, version);
    Ok(())
}

fn cmd_config_show(path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(path.as_ref())?;
    match path {
        Some(path) => println!("設定ファイル: {}", path.display()),
        None => println!("設定ファイル: {}", app_paths()?.config_path.display()),
    }
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init(force: bool) -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() && !force {
        bail!(
            "設定ファイルは既に存在します: {} (上書きするには --force を指定してください)",
            paths.config_path.display()
        );
    }
    let written = save_config(&AppConfig::default())?;
    println!("設定ファイルを作成しました: {}", written.display());
    Ok(())
}

fn print_table(plan: &RenamePlan) {
    println!("元ファイル -> 新ファイル (camera, seq)");
    for candidate in &plan.candidates {
        println!(
            "{} -> {} ({}, {}{})",
            candidate.original_path.display(),
            candidate.target_path.display(),
            candidate.camera_code,
            candidate.sequence_number,
            if candidate.duplicate_of_previous {
                ", duplicate"
            } else {
                ""
            }
        );
    }

    let stats = &plan.stats;
    println!(
        "\n集計: scanned={} photos={} non_photo_skip={} hidden_skip={} failed={} planned={} duplicates={}",
        stats.collect.scanned_files,
        stats.collect.photo_files,
        stats.collect.skipped_non_photo,
        stats.collect.skipped_hidden,
        stats.collect.failed,
        stats.planned,
        stats.duplicates
    );
}
