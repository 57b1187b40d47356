//! # `patch-openapi`
//!
//! Strips the generator's `"ref"` fields from the OpenAPI document consumed
//! by the documentation build, and derives the API-reference sidebar.
//!
//! ## Usage
//!
//! ```bash
//! patch-openapi [--config ./config/patch-openapi.toml] [<command>]
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | *(none)* | Same as `patch` with configured defaults |
//! | `patch-openapi patch` | Remove the field and rewrite the document in place |
//! | `patch-openapi sidebar` | Print or write the sidebar JSON |
//!
//! Progress goes to stderr. Set `RUST_LOG=openapi_patch=debug` for counts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use openapi_patch::config;
use openapi_patch::patch::{self, PatchOptions};
use openapi_patch::sanitize::SanitizeMode;
use openapi_patch::sidebar;

/// Post-process a generated OpenAPI document for the documentation site.
#[derive(Parser)]
#[command(
    name = "patch-openapi",
    about = "Strip unsupported fields from a generated OpenAPI document",
    version,
    long_about = "Removes the generator's \"ref\" pointer fields from the OpenAPI JSON document \
    before the documentation renderer consumes it, and derives the API-reference sidebar \
    from the cleaned document. Run without a command to patch the configured document."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional. When the file does not exist, built-in defaults are used
    /// (`docs/specs/openapi.json`, field `ref`, textual mode).
    #[arg(long, global = true, default_value = "./config/patch-openapi.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove the field from the document and overwrite it in place.
    ///
    /// The file is rewritten without a backup. Use `--dry-run` to see what
    /// would change.
    Patch {
        /// Document to patch. Overrides `spec.path`.
        #[arg(long)]
        spec: Option<PathBuf>,

        /// `textual` keeps every other byte; `structural` parses and
        /// re-serializes the JSON.
        #[arg(long, value_enum)]
        mode: Option<SanitizeMode>,

        /// Key to strip. Overrides `spec.field`.
        #[arg(long)]
        field: Option<String>,

        /// Compute the result without writing the file.
        #[arg(long)]
        dry_run: bool,

        /// Exit non-zero if the document still contains the field. Never writes.
        #[arg(long, conflicts_with = "dry_run")]
        check: bool,

        /// Print the patch report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Build the API-reference sidebar from the document.
    ///
    /// The document is read but not modified.
    Sidebar {
        /// Document to read. Overrides `spec.path`.
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Output file. Overrides `sidebar.output`; stdout when neither is set.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Prefix for every doc id. Overrides `sidebar.doc_prefix`.
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openapi_patch=info,patch_openapi=info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    let command = cli.command.unwrap_or(Commands::Patch {
        spec: None,
        mode: None,
        field: None,
        dry_run: false,
        check: false,
        json: false,
    });

    match command {
        Commands::Patch {
            spec,
            mode,
            field,
            dry_run,
            check,
            json,
        } => {
            let path = spec.unwrap_or_else(|| cfg.spec.path.clone());
            let field = field.unwrap_or_else(|| cfg.spec.field.clone());
            let mode = mode.unwrap_or(cfg.spec.mode);

            let report = if check {
                patch::check_file(&path, &field, mode)?
            } else {
                let options = PatchOptions {
                    field,
                    mode,
                    dry_run,
                };
                patch::patch_file(&path, &options)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            if check && report.removed() > 0 {
                anyhow::bail!(
                    "{} still contains {} '{}' field(s)",
                    report.path.display(),
                    report.removed(),
                    report.field
                );
            }
        }
        Commands::Sidebar {
            spec,
            output,
            prefix,
        } => {
            let path = spec.unwrap_or_else(|| cfg.spec.path.clone());
            let output = output.or_else(|| cfg.sidebar.output.clone());
            let prefix = prefix.unwrap_or_else(|| cfg.sidebar.doc_prefix.clone());
            sidebar::run_sidebar(&path, output.as_deref(), &prefix)?;
        }
    }

    Ok(())
}
