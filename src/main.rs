use clap::{Args, Parser, Subcommand};
use sheetforge::cli::{self, Overrides};
use sheetforge::error::ExportResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetforge")]
#[command(about = "Export game-design spreadsheets to TSV tables and translation tables.")]
#[command(long_about = "SheetForge - schema-driven spreadsheet exporter

Every sheet declares its own schema in its first four rows:
  row 1  column names     id | name | pos.x | pos.y | tag | tag
  row 2  type tokens      string | translate | number | number | string | string
  row 4  export scopes    cs | c | cs | cs | s | s

COMMANDS:
  export  - Export every configured workbook, then run post-export checks
  check   - Run post-export checks against already exported tables

EXAMPLES:
  sheetforge export                       # Uses ./Config
  sheetforge export --config tools/Config --scope c
  sheetforge check --output-dir ../Export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Config directory holding Export.json and friends
    #[arg(short, long, default_value = "Config", env = "SHEETFORGE_CONFIG")]
    config: PathBuf,

    /// Directory receiving exported tables (overrides Settings.json)
    #[arg(short, long, env = "SHEETFORGE_OUTPUT")]
    output_dir: Option<PathBuf>,

    /// Directory asset paths are checked against (overrides Settings.json)
    #[arg(long, env = "SHEETFORGE_ASSET_ROOT")]
    asset_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export every workbook listed in Export.json.

Runs one pass per configured scope (default: client 'c', then server 's'
with '_Server' file suffix). A failing sheet is reported with its row and
column and the export continues; the command exits non-zero at the end.

OUTPUT:
  <Sheet>.tsv          names line, type line, one line per row
  <Sheet>_i18n.tsv     translatable text (only when the sheet has any)")]
    /// Export workbooks to TSV tables
    Export {
        #[command(flatten)]
        paths: PathArgs,

        /// Base directory of workbook paths (overrides Settings.json)
        #[arg(short, long, env = "SHEETFORGE_SOURCE_ROOT")]
        source_root: Option<PathBuf>,

        /// Only run the pass with this scope token
        #[arg(long)]
        scope: Option<String>,

        /// Skip post-export checks
        #[arg(long)]
        no_check: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run post-export checks on exported tables
    Check {
        #[command(flatten)]
        paths: PathArgs,
    },
}

fn main() -> ExportResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Export {
            paths,
            source_root,
            scope,
            no_check,
            verbose,
        } => cli::export(
            paths.config,
            Overrides {
                output_dir: paths.output_dir,
                source_root,
                asset_root: paths.asset_root,
                scope,
            },
            no_check,
            verbose,
        ),

        Commands::Check { paths } => cli::check(
            paths.config,
            Overrides {
                output_dir: paths.output_dir,
                asset_root: paths.asset_root,
                ..Overrides::default()
            },
        ),
    }
}
