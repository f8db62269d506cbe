// CLI module - command-line argument parsing and handlers
//
// Provides subcommands for working with Aura values offline and for
// configuration management:
// - decode: wire value -> editable text
// - encode: editable text -> wire value
// - inspect: show the watched parameters of a raw HTTP request file
// - config --show/--reset/--edit/--update/--path

use crate::aura::{self, transform, ParamRequest, ParameterSnapshot};
use crate::config::{Config, VERSION};
use crate::http::HttpRequest;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// auraspy - Salesforce Aura parameter proxy and editor
#[derive(Parser)]
#[command(name = "auraspy")]
#[command(version = VERSION)]
#[command(
    about = "Intercepting proxy that highlights and edits Salesforce Aura parameters",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the editable form of a percent-encoded parameter value
    Decode {
        /// Wire value (read from stdin when omitted)
        value: Option<String>,
    },

    /// Print the wire form of editable text
    Encode {
        /// File with the edited text (read from stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Show the decoded Aura parameters of a raw HTTP request
    Inspect {
        /// File holding the request (request line, headers, blank line, body)
        file: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Rewrite config with the current template (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> bool {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Decode { value }) => handle_decode(value),
        Some(Commands::Encode { file }) => handle_encode(file.as_deref()),
        Some(Commands::Inspect { file }) => handle_inspect(&file),
        Some(Commands::Config {
            show,
            reset,
            edit,
            update,
            path,
        }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else if edit {
                handle_config_edit();
            } else if update {
                handle_config_update();
            } else {
                // No flag provided, show help
                println!("Usage: auraspy config [--show|--reset|--edit|--update|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --update  Rewrite config with the current template");
                println!("  --path    Show config file path");
            }
            Ok(())
        }
        None => return false, // No subcommand, run normal proxy
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Value commands
// ─────────────────────────────────────────────────────────────────────────────

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    Ok(input)
}

fn handle_decode(value: Option<String>) -> Result<()> {
    let wire = match value {
        Some(v) => v,
        None => read_stdin()?,
    };
    println!("{}", decode_value(&wire));
    Ok(())
}

fn handle_encode(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => read_stdin()?,
    };
    println!("{}", transform::encode(&text));
    Ok(())
}

fn handle_inspect(file: &Path) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let report = inspect_request(&raw)?;
    std::io::stdout().write_all(report.as_bytes())?;
    Ok(())
}

/// Decode a wire value, ignoring the line ending a shell pipe adds
fn decode_value(wire: &str) -> String {
    transform::decode(wire.trim_end_matches(['\r', '\n']))
}

/// Human-readable report of the watched parameters in a raw request
fn inspect_request(raw: &[u8]) -> Result<String> {
    let request = HttpRequest::parse(raw).context("Not a valid HTTP request")?;
    let params = request.params();
    let snapshot = ParameterSnapshot::from_params(&params);

    let mut out = format!("{}\n", request);
    if snapshot.is_empty() {
        out.push_str("No Aura parameters found\n");
        return Ok(out);
    }

    out.push_str(&format!(
        "Aura request: {} of {} watched parameters\n",
        snapshot.len(),
        aura::WATCHED_PARAMS.len()
    ));
    for (name, decoded) in snapshot.iter() {
        out.push_str(&format!("\n== {} ==\n", name));
        out.push_str(&transform::to_editable(decoded));
        out.push('\n');
    }
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = load_config();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("bind_addr = {:?}", config.bind_addr.to_string());
    println!("upstream_url = {:?}", config.upstream_url);
    println!("highlight_color = {:?}", config.highlight_color.as_str());
    println!("history_limit = {}", config.history_limit);
    println!("request_timeout_secs = {}", config.request_timeout_secs);
    println!("enable_tui = {}", config.enable_tui);
    println!("demo_mode = {}", config.demo_mode);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    // Write the default config (using Config's single source of truth)
    if let Err(e) = Config::default().save() {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Ensure config exists
    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    // Get editor from environment
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            // Platform-specific fallback
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

fn handle_config_update() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        // No existing config, just create default
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return;
    }

    // Regenerate from the effective config so user values survive
    let updated = load_config().to_toml();

    let backup_path = path.with_extension("toml.bak");
    if let Err(e) = std::fs::copy(&path, &backup_path) {
        eprintln!("Warning: Could not create backup: {}", e);
    } else {
        println!("Backup created: {}", backup_path.display());
    }

    if let Err(e) = std::fs::write(&path, updated) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config updated with latest structure: {}", path.display());
    println!("Your values have been preserved.");
}
