//! Command handlers

use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use errmap_app::clock::SystemClock;
use errmap_app::config::Config;
use errmap_app::export::export_records;
use errmap_app::repository::{resolve_ledger_path, result_ledger_factory};
use errmap_app::scanner::{validate_image, FolderScanner};
use errmap_app::workflow::Workflow;
use errmap_infra::persistence::read_ledger;
use errmap_types::{Error, OutputFormat, Result};

use crate::cli::{Cli, Commands};
use crate::output::{output_records, output_stats};
use crate::session;

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Measure {
            folder,
            image,
            delay_ms,
            fresh,
        } => {
            let mut config = config;
            if let Some(delay_ms) = delay_ms {
                config.transition_delay_ms = delay_ms;
            }
            cmd_measure(&config, &folder, image, fresh, output_format)
        }

        Commands::Review { path } => cmd_review(&config, &path, output_format),

        Commands::Stats { path } => cmd_stats(&config, &path, output_format),

        Commands::Export { path, output } => cmd_export(&config, &path, &output),

        Commands::Config {
            show,
            set_output,
            set_delay_ms,
            set_min_separation,
            set_results_folder,
            set_results_file,
            reset,
        } => cmd_config(
            config,
            show,
            set_output,
            set_delay_ms,
            set_min_separation,
            set_results_folder,
            set_results_file,
            reset,
        ),
    }
}

fn cmd_measure(
    config: &Config,
    folder: &Path,
    image: PathBuf,
    fresh: bool,
    output_format: OutputFormat,
) -> Result<()> {
    if !folder.is_dir() {
        return Err(Error::FileNotFound(folder.display().to_string()));
    }
    let (width, height) = validate_image(&image)?;
    info!(image = %image.display(), width, height, "calibration image loaded");

    let ledger_path = config.results_path(folder);
    let mut flow = Workflow::new(
        folder,
        FolderScanner,
        result_ledger_factory(config, folder, fresh),
        SystemClock,
        config.transition_delay(),
        config.min_point_separation,
    );
    flow.select_calibration_image(image)?;

    println!("Selected Folder: {}", folder.display());
    session::run(
        &mut flow,
        io::stdin().lock(),
        &mut io::stdout(),
        output_format,
        std::thread::sleep,
    )?;

    let recorded = flow.trials()?.len();
    println!("{} trials recorded in {}", recorded, ledger_path.display());
    Ok(())
}

fn cmd_review(config: &Config, path: &Path, output_format: OutputFormat) -> Result<()> {
    let ledger_path = resolve_ledger_path(config, path);
    let records = match read_ledger(&ledger_path) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %ledger_path.display(), error = %e, "could not read result file");
            eprintln!("Error: {}", e);
            Vec::new()
        }
    };
    output_records(output_format, &records)
}

fn cmd_stats(config: &Config, path: &Path, output_format: OutputFormat) -> Result<()> {
    let records = read_ledger(&resolve_ledger_path(config, path))?;
    output_stats(output_format, &records)
}

fn cmd_export(config: &Config, path: &Path, output: &Path) -> Result<()> {
    let records = read_ledger(&resolve_ledger_path(config, path))?;
    export_records(&records, output)?;
    println!("Exported {} trials to: {}", records.len(), output.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    mut config: Config,
    show: bool,
    set_output: Option<OutputFormat>,
    set_delay_ms: Option<u64>,
    set_min_separation: Option<f64>,
    set_results_folder: Option<String>,
    set_results_file: Option<String>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut modified = false;

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(delay_ms) = set_delay_ms {
        config.transition_delay_ms = delay_ms;
        modified = true;
    }

    if let Some(min_separation) = set_min_separation {
        config.min_point_separation = min_separation;
        modified = true;
    }

    if let Some(folder_name) = set_results_folder {
        config.results_folder_name = folder_name;
        modified = true;
    }

    if let Some(file_name) = set_results_file {
        config.results_file_name = file_name;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
