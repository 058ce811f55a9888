//! Command-line interface definitions for Food Safety Wire.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The emitted JSON goes to stdout; everything diagnostic goes to stderr, so
//! the output can be piped straight into the scoring agent.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::models::SourceId;

/// Command-line arguments for Food Safety Wire.
///
/// # Examples
///
/// ```sh
/// # Full aggregate digest for the last day
/// food_safety_wire --days 1
///
/// # One adapter, pinned window
/// food_safety_wire fda --since 2026-08-01 --limit 50
///
/// # Aggregate over a subset of sources
/// food_safety_wire --sources fsn,fda --days 3
///
/// # Magazine adapter, selected topics
/// food_safety_wire fsm --topics recalls,pathogens
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source to fetch; omit (or pass `all`) for the deduplicated aggregate
    #[arg(value_enum)]
    pub source: Option<SourceArg>,

    /// Look back this many days (each adapter has its own default)
    #[arg(long)]
    pub days: Option<u32>,

    /// Only items published on or after this date; overrides --days
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub since: Option<NaiveDate>,

    /// Maximum records to request from the FDA enforcement API
    #[arg(long)]
    pub limit: Option<u32>,

    /// Comma-separated magazine topic slugs (fsm only)
    #[arg(long, value_delimiter = ',')]
    pub topics: Option<Vec<String>>,

    /// Narrow the aggregate run to these sources
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<SourceArg>>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// CLI spelling of a source selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    Fsn,
    Fsm,
    Fda,
    Fsis,
    Cdc,
    All,
}

impl SourceArg {
    /// The concrete source this argument names; `None` for `all`.
    pub fn source_id(self) -> Option<SourceId> {
        match self {
            SourceArg::Fsn => Some(SourceId::Fsn),
            SourceArg::Fsm => Some(SourceId::Fsm),
            SourceArg::Fda => Some(SourceId::Fda),
            SourceArg::Fsis => Some(SourceId::Fsis),
            SourceArg::Cdc => Some(SourceId::Cdc),
            SourceArg::All => None,
        }
    }
}

impl Cli {
    /// The sources an aggregate run should fan out to.
    pub fn enabled_sources(&self) -> Vec<SourceId> {
        match &self.sources {
            Some(selected) => selected.iter().filter_map(|s| s.source_id()).collect(),
            None => SourceId::ALL.to_vec(),
        }
    }
}
