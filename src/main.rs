//! Subject Stacker - prepare microscopy z-stacks for crowdsourced annotation.
//!
//! This binary wires the library together: load a stack, cut it into subject
//! sets and tiles, write JPEGs, and upload the result to a catalog.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serde::Serialize;
use subject_stacker::{
    catalog::{Catalog, InMemoryCatalog, LocalCatalog, PanoptesCatalog},
    config::{Backend, Cli, Command, SubjectsConfig, TilesConfig, UploadConfig},
    export::{subject_items, subject_tile_items, tile_items, ExportSummary, OutputWriter},
    stack::{load_stack, ImageStack},
    tile::{tiles_dir_name, Tiler},
    upload::{BatchUploader, UploadPlanner},
    window::{prefix_from_path, subject_windows, DEFAULT_PREFIX},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Subjects(config) => run_subjects(config),
        Command::Tiles(config) => run_tiles(config),
        Command::Upload(config) => run_upload(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "subject_stacker=debug"
    } else {
        "subject_stacker=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the input stack, logging failures.
fn load(input: &std::path::Path) -> Option<ImageStack> {
    match load_stack(input) {
        Ok(stack) => Some(stack),
        Err(e) => {
            error!("Failed to load stack from {}: {}", input.display(), e);
            None
        }
    }
}

/// Explicit prefix, else one derived from the first slice's file name.
fn resolve_prefix(prefix: Option<&str>, stack: &ImageStack) -> String {
    match prefix {
        Some(p) => p.to_string(),
        None => stack
            .source(0)
            .map(prefix_from_path)
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
    }
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize summary: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Subjects Command
// =============================================================================

#[derive(Serialize)]
struct SubjectSetSummary {
    name: String,
    z_start: usize,
    z_end: usize,
    slices: usize,
    short: bool,
}

#[derive(Serialize)]
struct SubjectsSummary {
    prefix: String,
    subject_sets: Vec<SubjectSetSummary>,
    export: ExportSummary,
}

fn run_subjects(config: SubjectsConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let spec = match config.window_spec() {
        Ok(spec) => spec,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let tiler = match config.tile_spec().transpose() {
        Ok(spec) => spec.map(Tiler::new),
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(stack) = load(&config.input) else {
        return ExitCode::FAILURE;
    };
    let prefix = resolve_prefix(config.prefix.as_deref(), &stack);

    if spec.is_degenerate(stack.len()) {
        warn!(
            "Window extent {} does not fit in {} slice(s); nothing to export",
            spec.extent(),
            stack.len()
        );
    }
    if spec.overlaps() && spec.extent() > 0 {
        info!(
            "Group size {} is within the window extent {}; subject sets overlap",
            spec.group_size,
            spec.extent()
        );
    }

    let writer = OutputWriter::new(&config.output, config.jpeg_quality);
    let mut export = ExportSummary::default();
    let mut subject_sets = Vec::new();

    for subject in subject_windows(stack.len(), spec, prefix.as_str()) {
        let result = writer
            .write_all(subject_items(&stack, &subject, &prefix))
            .and_then(|summary| {
                export += summary;
                match tiler {
                    Some(tiler) => {
                        writer.write_all(subject_tile_items(&stack, &subject, tiler, &prefix))
                    }
                    None => Ok(ExportSummary::default()),
                }
            });

        match result {
            Ok(summary) => export += summary,
            Err(e) => {
                error!("Failed to export {}: {}", subject.name, e);
                return ExitCode::FAILURE;
            }
        }

        subject_sets.push(SubjectSetSummary {
            name: subject.name.to_string(),
            z_start: subject.window.z_start(),
            z_end: subject.window.z_end(),
            slices: subject.window.len(),
            short: subject.window.is_short(),
        });
    }

    info!(
        "Exported {} subject set(s) to {}",
        subject_sets.len(),
        config.output.display()
    );

    if config.json {
        return print_json(&SubjectsSummary {
            prefix,
            subject_sets,
            export,
        });
    }
    ExitCode::SUCCESS
}

// =============================================================================
// Tiles Command
// =============================================================================

#[derive(Serialize)]
struct TilesSummary {
    prefix: String,
    directory: String,
    slices: usize,
    export: ExportSummary,
}

fn run_tiles(config: TilesConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let tiler = match config.tile_spec() {
        Ok(spec) => Tiler::new(spec).with_fill(config.fill),
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(stack) = load(&config.input) else {
        return ExitCode::FAILURE;
    };
    let prefix = resolve_prefix(config.prefix.as_deref(), &stack);

    let writer = OutputWriter::new(&config.output, config.jpeg_quality);
    let export = match writer.write_all(tile_items(&stack, tiler, &prefix)) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to export tiles: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        return print_json(&TilesSummary {
            directory: tiles_dir_name(tiler.spec()),
            prefix,
            slices: stack.len(),
            export,
        });
    }
    ExitCode::SUCCESS
}

// =============================================================================
// Upload Command
// =============================================================================

fn build_catalog(config: &UploadConfig) -> Option<Arc<dyn Catalog>> {
    match config.backend {
        Backend::DryRun => {
            info!("Dry run: nothing leaves this machine");
            Some(Arc::new(InMemoryCatalog::new()))
        }
        Backend::Local => {
            let dir = config.catalog_dir.as_ref()?;
            info!("Local catalog at {}", dir.display());
            Some(Arc::new(LocalCatalog::new(dir)))
        }
        Backend::Panoptes => {
            let project_id = config.project_id.as_deref().unwrap_or_default();
            let token = config.token.as_deref().unwrap_or_default();
            match PanoptesCatalog::new(&config.api_url, project_id, token) {
                Ok(catalog) => {
                    info!("Panoptes project {} at {}", project_id, config.api_url);
                    Some(Arc::new(catalog))
                }
                Err(e) => {
                    error!("Failed to create Panoptes client: {}", e);
                    None
                }
            }
        }
    }
}

async fn run_upload(config: UploadConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let batches = match UploadPlanner::new(config.batch_size).plan(&config.input) {
        Ok(batches) => batches,
        Err(e) => {
            error!("Failed to scan {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if batches.is_empty() {
        warn!("No subject sets found under {}", config.input.display());
    }

    let Some(catalog) = build_catalog(&config) else {
        return ExitCode::FAILURE;
    };

    let report = match BatchUploader::new(catalog).upload(&batches).await {
        Ok(report) => report,
        Err(e) => {
            error!("Upload failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for name in &report.skipped {
        warn!("Skipped existing subject set {}", name);
    }

    if config.json {
        return print_json(&report);
    }
    ExitCode::SUCCESS
}
