use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::{DEFAULT_COLUMNS, DEFAULT_GRACE_STEPS, DEFAULT_TILE_BUDGET, Scheme, TargetPolicy};

/// Tilegram CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "tilegram", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute a tilegram from a geography and a metric CSV
    Generate(GenerateArgs),

    /// Render a TopoJSON tilegram to SVG
    Render(RenderArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum SchemeArg { Hex, Square }

impl From<SchemeArg> for Scheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Hex => Scheme::Hex,
            SchemeArg::Square => Scheme::Square,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum PolicyArg { Rounded, LargestRemainder }

impl From<PolicyArg> for TargetPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Rounded => TargetPolicy::Rounded,
            PolicyArg::LargestRemainder => TargetPolicy::LargestRemainder,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Input GeoJSON FeatureCollection
    #[arg(value_hint = ValueHint::FilePath)]
    pub geography: PathBuf,

    /// Input CSV with `id,metric` columns
    #[arg(value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    /// Output TopoJSON file (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Also render the result to this SVG file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub svg: Option<PathBuf>,

    /// Feature property holding the region id
    #[arg(long, default_value = "id")]
    pub id_key: String,

    /// Feature property holding the region name
    #[arg(long)]
    pub name_key: Option<String>,

    /// Tile shape
    #[arg(long, value_enum, default_value_t = SchemeArg::Hex)]
    pub scheme: SchemeArg,

    /// Tiles across the longer side of the geography
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    pub columns: u32,

    /// Metric per tile (defaults to the total metric over --tiles)
    #[arg(long)]
    pub resolution: Option<f64>,

    /// Approximate tile count used when --resolution is not given
    #[arg(long, default_value_t = DEFAULT_TILE_BUDGET)]
    pub tiles: usize,

    /// How region targets are rounded
    #[arg(long, value_enum, default_value_t = PolicyArg::Rounded)]
    pub policy: PolicyArg,

    /// Blocked steps before a region is reported unsatisfiable
    #[arg(long, default_value_t = DEFAULT_GRACE_STEPS)]
    pub grace: u32,

    /// Do not release split-off fragments of a region
    #[arg(long)]
    pub no_repair: bool,

    /// Stop after this many steps even if not converged
    #[arg(long, default_value_t = 10_000)]
    pub max_steps: usize,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input TopoJSON tilegram
    #[arg(value_hint = ValueHint::FilePath)]
    pub tilegram: PathBuf,

    /// Output SVG file (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Drawing width
    #[arg(long, default_value_t = 960.0)]
    pub width: f64,

    /// Drawing height
    #[arg(long, default_value_t = 720.0)]
    pub height: f64,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}
