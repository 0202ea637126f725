//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Lay out a decision tree and animate records travelling to their predicted leaves
#[derive(Parser, Debug)]
#[command(name = "dtviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Tree document (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    /// Records document (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub records: Option<PathBuf>,

    /// Viewport width used for the layout (overrides config)
    #[arg(short, long, global = true)]
    pub width: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Animate records through the tree, batch by batch
    Run {
        /// Stop after this many batches (default: until all records are done)
        #[arg(short, long)]
        batches: Option<usize>,

        /// Points per batch (overrides config)
        #[arg(short = 'n', long)]
        batch_size: Option<usize>,

        /// Advance frames without waiting on wall time
        #[arg(long)]
        instant: bool,

        /// Print the laid-out tree with leaf occupancy afterwards
        #[arg(long)]
        show_tree: bool,

        /// Print the hover card of every settled point afterwards
        #[arg(long)]
        tooltips: bool,
    },

    /// Show the laid-out tree
    Tree {
        /// Also list edges with length and angle
        #[arg(long)]
        edges: bool,
    },

    /// Show the decision path of one record
    Classify {
        /// 1-based record number
        number: usize,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show the global config location
    Path,
}
