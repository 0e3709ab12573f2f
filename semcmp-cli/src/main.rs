//! semcmp - semantic equivalence checks for XML, HTML, JSON and YAML files.
//!
//! Exit status is 0 when the documents are equivalent, 1 when they are not
//! and 2 on any error.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use semcmp::{
    compare_files, lookup_profile, profile_names, Classification, ComparisonResult, Format,
    GlobalConfig, Overrides, ResolveArgs,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Semantic document comparison
#[derive(Parser)]
#[command(name = "semcmp")]
#[command(version)]
#[command(about = "Semantic equivalence checks for markup and data documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents
    #[command(visible_alias = "c")]
    Compare {
        /// Left document
        left: String,
        /// Right document
        right: String,

        /// Document format (xml, html, json, yaml); defaults to the file extension
        #[arg(short, long)]
        format: Option<String>,

        /// Match profile to apply
        #[arg(short, long)]
        profile: Option<String>,

        /// Dimension behavior, e.g. `text_content=normalize` (repeatable)
        #[arg(short, long = "set", value_name = "DIM=BEHAVIOR")]
        set: Vec<String>,

        /// Attribute that identifies an element among its siblings (repeatable)
        #[arg(long = "identity-attr", value_name = "NAME")]
        identity_attrs: Vec<String>,

        /// Regular expression for attribute names to skip (repeatable)
        #[arg(long = "ignore-attr", value_name = "PATTERN")]
        ignore_attrs: Vec<String>,

        /// Preprocessing mode (none, normalize, canonicalize, pretty-format, rendered)
        #[arg(long)]
        preprocessing: Option<String>,

        /// TOML file with global profile and overrides per format
        #[arg(long, value_name = "FILE")]
        config: Option<String>,

        /// Also list informative and formatting differences, and log at debug level
        #[arg(short, long)]
        verbose: bool,

        /// Also list formatting differences
        #[arg(long)]
        show_formatting: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List built-in and registered profiles
    Profiles,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Compare { verbose: true, .. });
    init_tracing(verbose);

    let result = match cli.command {
        Commands::Compare {
            left,
            right,
            format,
            profile,
            set,
            identity_attrs,
            ignore_attrs,
            preprocessing,
            config,
            verbose,
            show_formatting,
            output,
        } => {
            let request = CompareRequest {
                left,
                right,
                format,
                profile,
                set,
                identity_attrs,
                ignore_attrs,
                preprocessing,
                config,
            };
            run_compare(request, verbose, show_formatting, output.as_deref())
        }
        Commands::Profiles => run_profiles().map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

struct CompareRequest {
    left: String,
    right: String,
    format: Option<String>,
    profile: Option<String>,
    set: Vec<String>,
    identity_attrs: Vec<String>,
    ignore_attrs: Vec<String>,
    preprocessing: Option<String>,
    config: Option<String>,
}

impl CompareRequest {
    fn format(&self) -> anyhow::Result<Format> {
        let format = match &self.format {
            Some(name) => Format::parse(name)?,
            None => Format::from_path(&self.left)
                .with_context(|| format!("cannot infer format of {}", self.left))?,
        };
        Ok(format)
    }

    fn resolve_args(&self, format: Format) -> anyhow::Result<ResolveArgs> {
        let mut args = ResolveArgs::new();
        if let Some(path) = &self.config {
            let config = GlobalConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path))?;
            args = args.global(config.for_format(format));
        }
        if let Some(profile) = &self.profile {
            args = args.profile(profile.as_str());
        }
        if let Some(mode) = &self.preprocessing {
            args = args.preprocessing(mode.as_str());
        }

        let mut overrides = Overrides::new();
        for setting in &self.set {
            let Some((dimension, behavior)) = setting.split_once('=') else {
                bail!("expected DIM=BEHAVIOR, got '{}'", setting);
            };
            overrides = overrides.set(dimension.trim(), behavior.trim());
        }
        if !self.identity_attrs.is_empty() {
            overrides = overrides.identity_attributes(self.identity_attrs.iter().cloned());
        }
        if !self.ignore_attrs.is_empty() {
            overrides = overrides.ignore_attributes(self.ignore_attrs.iter().cloned());
        }
        if overrides != Overrides::default() {
            args = args.overrides(overrides);
        }
        Ok(args)
    }
}

/// Runs a comparison and reports it. Returns whether the documents are equivalent.
fn run_compare(
    request: CompareRequest,
    verbose: bool,
    show_formatting: bool,
    output_path: Option<&str>,
) -> anyhow::Result<bool> {
    let format = request.format()?;
    let args = request.resolve_args(format)?;
    debug!(left = %request.left, right = %request.right, %format, "comparing");

    let result = compare_files(&request.left, &request.right, Some(format), &args)
        .with_context(|| format!("failed to compare {} and {}", request.left, request.right))?;

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    report(&mut output, &result, verbose, show_formatting)?;
    output.flush()?;

    Ok(result.equivalent())
}

fn report(
    out: &mut dyn Write,
    result: &ComparisonResult,
    verbose: bool,
    show_formatting: bool,
) -> io::Result<()> {
    for diff in result.differences() {
        let shown = match diff.classification() {
            Some(Classification::Normative) | None => true,
            Some(Classification::Informative) => verbose,
            Some(Classification::Formatting) => verbose || show_formatting,
        };
        if shown {
            writeln!(out, "{}", diff)?;
        }
    }

    let verdict = if result.equivalent() {
        "equivalent"
    } else {
        "not equivalent"
    };
    writeln!(out, "{} ({})", verdict, result.summary())
}

fn run_profiles() -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    for name in profile_names() {
        let profile = lookup_profile(&name)?;
        let mut line = profile.name().to_string();
        if let Some(mode) = profile.preprocessing() {
            line.push_str(&format!(" preprocessing={}", mode));
        }
        for (dimension, behavior) in profile.settings() {
            line.push_str(&format!(" {}={}", dimension, behavior));
        }
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
