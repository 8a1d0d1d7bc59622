//! CLI definition using clap

use clap::{ArgAction, Parser, Subcommand};
use errmap_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "errmap")]
#[command(version)]
#[command(about = "Measure motor-skill error from clicked points on calibrated images")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose logging on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calibrate on one image, then measure every other image in the folder
    Measure {
        /// Folder containing the image set
        folder: PathBuf,

        /// Calibration image (inside or outside the folder)
        #[arg(long, short = 'i')]
        image: PathBuf,

        /// Pause before the next image, in milliseconds. Uses config value if not specified.
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Truncate an existing result file instead of appending
        #[arg(long)]
        fresh: bool,
    },

    /// Show recorded trials
    Review {
        /// Result file, or the image folder holding Results/
        path: PathBuf,
    },

    /// Summary statistics of recorded trials
    Stats {
        /// Result file, or the image folder holding Results/
        path: PathBuf,
    },

    /// Export recorded trials to Excel or CSV
    Export {
        /// Result file, or the image folder holding Results/
        path: PathBuf,

        /// Output file (.xlsx or .csv)
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set the pause between images in milliseconds
        #[arg(long)]
        set_delay_ms: Option<u64>,

        /// Set the minimum calibration point separation
        #[arg(long)]
        set_min_separation: Option<f64>,

        /// Set the results folder name
        #[arg(long)]
        set_results_folder: Option<String>,

        /// Set the result file name
        #[arg(long)]
        set_results_file: Option<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
