// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Build front-end assets through a glob-driven task pipeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory. If the
    /// file does not exist, built-in defaults are used.
    #[arg(long, value_name = "PATH", default_value = "Assetpipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the task table (name, sources, destination) without executing.
    #[arg(long)]
    pub dry_run: bool,

    /// Pipeline command to run. Without one, the default pipeline
    /// (templates, styles, scripts) runs and the dev server starts.
    #[command(subcommand)]
    pub command: Option<PipelineCommand>,
}

/// Named pipeline commands.
///
/// `Build` and `Minify` are aggregates over a fixed set of leaf tasks; the
/// rest trigger a single task and exit when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum PipelineCommand {
    /// Run the default pipeline (templates, styles, scripts) once.
    Build,
    /// Run the minification pipeline (minify-css, minify-html, bundle,
    /// vendor, fonts) once.
    Minify,
    /// Serve the public directory with live reload and watch for changes.
    Serve,
    /// Compile templates into HTML at the public root.
    Templates,
    /// Process stylesheets into the public styles directory.
    Styles,
    /// Transpile scripts into the public scripts directory.
    Scripts,
    /// Concatenate and minify vendor scripts into vendor.js.
    Vendor,
    /// Concatenate and minify project scripts into main.js.
    Bundle,
    /// Minify generated CSS in place.
    MinifyCss,
    /// Minify generated HTML in place.
    MinifyHtml,
    /// Optimize images into the public images directory.
    Images,
    /// Copy fonts into the public fonts directory.
    Fonts,
    /// Delete the public directory.
    Clean,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
