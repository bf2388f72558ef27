//! Purify CLI
//!
//! Sanitizes an HTML fragment read from a file, an argument or stdin and
//! prints the result.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use purify_common::{Diagnostic, Severity};
use purify_core::{Config, Purifier};
use tracing_subscriber::EnvFilter;

/// Purify: whitelist-based HTML sanitizer
#[derive(Parser, Debug)]
#[command(name = "purify")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Sanitize a file
    purify ./comment.html

    # Sanitize inline markup
    purify --html '<b onclick="x()">hi</b>'

    # Restrict the output to a few elements
    purify --set 'HTML.Allowed="p,b,a[href]"' ./comment.html

    # Load directives from a JSON file and show what was removed
    purify --config policy.json --errors ./comment.html
"#)]
struct Cli {
    /// Path to an HTML file; stdin is read when neither this nor --html is given
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Sanitize this string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Directives as a JSON object or a path to a JSON file, flat or nested
    /// by namespace
    #[arg(short, long, value_name = "JSON|FILE")]
    config: Option<String>,

    /// Set one directive; the value is parsed as JSON when it can be
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    directives: Vec<String>,

    /// Tokenizer to use (direct or native)
    #[arg(long, value_name = "NAME")]
    lexer: Option<String>,

    /// Print diagnostics to stderr
    #[arg(short, long)]
    errors: bool,

    /// Print diagnostics as JSON instead of colored text
    #[arg(long, requires = "errors")]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let purifier = Purifier::new(config).context("invalid configuration")?;
    tracing::debug!(?purifier, "configured");

    let input = read_input(&cli)?;
    let purified = purifier.purify(&input)?;
    println!("{}", purified.html);

    if let Some(errors) = purified.errors {
        if cli.json {
            eprintln!("{}", serde_json::to_string_pretty(errors.diagnostics())?);
        } else {
            for diagnostic in errors.diagnostics() {
                print_diagnostic(diagnostic);
            }
        }
    }
    Ok(())
}

/// Assemble the configuration from the file, the overrides and the flags.
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.as_deref() {
        Some(inline) if inline.trim_start().starts_with('{') => Config::from_json(inline)?,
        Some(path) => {
            let source =
                fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            Config::from_json(&source)?
        }
        None => Config::new(),
    };

    for directive in &cli.directives {
        let Some((key, raw)) = directive.split_once('=') else {
            bail!("expected KEY=VALUE, got {directive:?}");
        };
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        config.set(key.trim(), value)?;
    }
    if let Some(lexer) = &cli.lexer {
        config.set("Core.LexerImpl", lexer.as_str())?;
    }
    if cli.errors {
        config.set("Core.CollectErrors", true)?;
    }
    Ok(config)
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        return Ok(html.clone());
    }
    if let Some(path) = &cli.path {
        return fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
    }
    let mut input = String::new();
    let _ = io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let severity = diagnostic.severity.to_string();
    let severity = match diagnostic.severity {
        Severity::Error => severity.red().to_string(),
        Severity::Warning => severity.yellow().to_string(),
        Severity::Notice => severity.dimmed().to_string(),
    };
    let line = diagnostic
        .line
        .map(|line| format!("line {line}: "))
        .unwrap_or_default();
    if diagnostic.args.is_empty() {
        eprintln!("{severity} {line}{}", diagnostic.key);
    } else {
        eprintln!(
            "{severity} {line}{} ({})",
            diagnostic.key,
            diagnostic.args.join(", ")
        );
    }
}
