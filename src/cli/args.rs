//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{BalanceStrategy, Key};

/// AVL tree engine: build, inspect and compare height-balanced search trees
#[derive(Parser, Debug)]
#[command(name = "rsavl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: ./.rsavl.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Rebalancing strategy, overrides config [balance-factor, height]
    #[arg(short, long, global = true)]
    pub strategy: Option<BalanceStrategy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert keys into an AVL tree and report its statistics
    Build {
        /// Keys in insertion order
        #[arg(required = true, allow_negative_numbers = true)]
        keys: Vec<Key>,
        /// Keys to remove afterwards, in order
        #[arg(short, long, num_args = 1.., allow_negative_numbers = true)]
        remove: Vec<Key>,
        /// Print the tree with balance factors
        #[arg(short, long)]
        tree: bool,
    },

    /// Compare perfect, AVL and plain search trees on random keys
    Compare {
        /// Number of unique keys
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Smallest key
        #[arg(long, allow_negative_numbers = true)]
        min: Option<Key>,
        /// Largest key
        #[arg(long, allow_negative_numbers = true)]
        max: Option<Key>,
        /// RNG seed for repeatable runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Insert then remove keys, checking all invariants after every step
    Check {
        #[arg(required = true, allow_negative_numbers = true)]
        keys: Vec<Key>,
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
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
