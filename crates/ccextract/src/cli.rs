use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use ccextract_catalog::{ArchiveLocation, Catalog};
use ccextract_fs::OutputDir;
use clap::{ArgAction, Parser};
use figment::providers::Serialized;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::run::{Extractor, RunReport};

/// Identifier used when none is given: everything below the archive root.
pub const DEFAULT_IDENTIFIER: &str = ".";

/// Exit status for a rejected command line or a failed bootstrap.
pub const USAGE_EXIT_CODE: u8 = 1;

#[derive(Clone, Debug, Parser)]
#[command(name = "ccextract", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Catalog XML describing the archive
    #[arg(short = 'x', long = "copycat-xml", value_name = "XML")]
    pub catalog: Option<PathBuf>,

    /// Existing directory to extract into
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Overwrite files that already exist
    #[arg(short, long)]
    pub force: bool,

    /// Configuration file (default: ./ccextract.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Skip size and checksum checks against the catalog
    #[arg(long)]
    pub no_verify: bool,

    /// Archive to extract from, a path or `scheme:path`
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Entry paths or indirect ids; all entries when omitted
    #[arg(value_name = "PATH|ID")]
    pub identifiers: Vec<String>,
}

/// Flags given on the command line, merged over every other layer.
#[derive(Debug, Default, Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verify: Option<bool>,
}

impl Cli {
    /// Parse `args`, printing clap's message when no `Cli` results.
    ///
    /// The error is the exit status: [`USAGE_EXIT_CODE`] for a bad command
    /// line, 0 after `--help` or `--version`.
    pub fn parse_args<I, T>(args: I) -> Result<Self, u8>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| {
            let _ = e.print();
            if e.use_stderr() { USAGE_EXIT_CODE } else { 0 }
        })
    }

    pub fn identifiers(&self) -> Vec<&str> {
        if self.identifiers.is_empty() {
            vec![DEFAULT_IDENTIFIER]
        } else {
            self.identifiers.iter().map(String::as_str).collect()
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            output_dir: self.directory.clone(),
            catalog: self.catalog.clone(),
            force: self.force.then_some(true),
            verify: self.no_verify.then_some(false),
        }
    }

    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let figment = Config::figment(self.config.as_deref())?.merge(Serialized::defaults(self.overrides()));
        Config::from_figment(&figment)
    }

    /// `EnvFilter` directive for this invocation when `RUST_LOG` is unset.
    pub fn log_filter(&self, config: &Config) -> String {
        match self.verbose {
            0 => config.log_level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

/// Open everything the run needs, then run it.
pub fn execute(cli: &Cli, config: &Config) -> anyhow::Result<RunReport> {
    let output = OutputDir::open(&config.output_dir)
        .with_context(|| format!("cannot use output directory {}", config.output_dir.display()))?;

    let location = ArchiveLocation::parse(&cli.archive)?;

    let xml = config
        .catalog
        .as_deref()
        .ok_or_else(|| anyhow!("no catalog given: pass -x/--copycat-xml or set `catalog`"))?;
    let catalog = Catalog::load(xml, &location.root)
        .with_context(|| format!("failed to load catalog {}", xml.display()))?;

    let root = catalog.root_view();
    let base = catalog
        .base_view(&location.name)
        .with_context(|| format!("cannot open archive {}", location.archive_path().display()))?;

    info!(
        archive = %location.archive_path().display(),
        output = %output.path().display(),
        "starting extraction"
    );

    let report = Extractor::new(root, base, &output)
        .scheme(config.scheme())
        .archive(&location.name)
        .options(config.copy_options())
        .run(cli.identifiers())?;
    Ok(report)
}
