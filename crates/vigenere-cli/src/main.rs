//! Vigenère cryptanalysis CLI
//!
//! The `vigenere` command breaks Vigenère ciphertext by Kasiski examination
//! and frequency analysis.
//!
//! ## Commands
//!
//! - `analyze`: Full pipeline (patterns, ranked key lengths, key, plaintext)
//! - `lengths`: Ranked key-length candidates only
//! - `patterns`: Repeated substrings and their offsets
//! - `decrypt`: Decrypt with a known key
//! - `encrypt`: Encrypt with a known key

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use vigenere_core::{
    build_report, decrypt_text, encrypt, render_report_text, write_report_json, AnalysisConfig,
    CipherBreaker, CiphertextDocument, KasiskiAnalyzer, Key, Language,
};

/// Pattern lengths listed in the `analyze` summary.
const REPORTED_PATTERN_LENGTHS: std::ops::RangeInclusive<usize> = 3..=5;

#[derive(Parser)]
#[command(name = "vigenere")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Statistical Vigenère cipher breaker", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Language model used for frequency analysis
    #[arg(long, global = true, default_value = "english", env = "VIGENERE_LANGUAGE")]
    language: Language,

    /// Drop every non-letter (not just whitespace) while normalizing input
    #[arg(long, global = true)]
    strip: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the key and plaintext
    Analyze {
        /// Ciphertext file (default: stdin)
        file: Option<PathBuf>,

        /// Use this key length instead of the Kasiski estimate
        #[arg(short, long)]
        key_length: Option<usize>,

        /// Largest key length considered by the examination
        #[arg(long)]
        max_key_length: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank candidate key lengths
    Lengths {
        /// Ciphertext file (default: stdin)
        file: Option<PathBuf>,

        /// Number of candidates to show
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// List repeated substrings
    Patterns {
        /// Ciphertext file (default: stdin)
        file: Option<PathBuf>,

        /// Shortest pattern length
        #[arg(long, default_value = "3")]
        min: usize,

        /// Longest pattern length
        #[arg(long, default_value = "5")]
        max: usize,
    },

    /// Decrypt with a known key
    Decrypt {
        /// Ciphertext file (default: stdin)
        file: Option<PathBuf>,

        #[arg(short, long)]
        key: String,
    },

    /// Encrypt with a known key
    Encrypt {
        /// Plaintext file (default: stdin)
        file: Option<PathBuf>,

        #[arg(short, long)]
        key: String,
    },
}

/// Input options shared by every subcommand.
struct InputOptions {
    language: Language,
    strip: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    vigenere_core::init_tracing(cli.json_logs, level);

    let opts = InputOptions {
        language: cli.language,
        strip: cli.strip,
    };

    let output = match cli.command {
        Commands::Analyze {
            file,
            key_length,
            max_key_length,
            json,
            output,
        } => cmd_analyze(
            &opts,
            file.as_deref(),
            key_length,
            max_key_length,
            json,
            output.as_deref(),
        )?,
        Commands::Lengths { file, top, json } => cmd_lengths(&opts, file.as_deref(), top, json)?,
        Commands::Patterns { file, min, max } => cmd_patterns(&opts, file.as_deref(), min, max)?,
        Commands::Decrypt { file, key } => cmd_decrypt(&opts, file.as_deref(), &key)?,
        Commands::Encrypt { file, key } => cmd_encrypt(&opts, file.as_deref(), &key)?,
    };

    println!("{}", output);
    Ok(())
}

fn cmd_analyze(
    opts: &InputOptions,
    file: Option<&Path>,
    key_length: Option<usize>,
    max_key_length: Option<usize>,
    json: bool,
    output: Option<&Path>,
) -> Result<String> {
    let mut doc = load_document(opts, file)?;
    doc.set_key_length_override(key_length);

    let breaker = CipherBreaker::new(load_config(max_key_length)?)
        .context("Invalid analysis configuration")?;
    let report = build_report(&breaker, &doc, REPORTED_PATTERN_LENGTHS)
        .context("Cryptanalysis failed")?;

    if let Some(path) = output {
        write_report_json(path, &report)?;
        info!(path = %path.display(), "wrote analysis report");
    }

    if json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render_report_text(&report))
    }
}

fn cmd_lengths(opts: &InputOptions, file: Option<&Path>, top: usize, json: bool) -> Result<String> {
    let doc = load_document(opts, file)?;
    let analyzer =
        KasiskiAnalyzer::new(load_config(None)?).context("Invalid analysis configuration")?;
    let mut candidates = analyzer
        .find_possible_key_lengths(&doc)
        .context("Key length estimation failed")?;
    candidates.truncate(top);

    if json {
        return Ok(serde_json::to_string_pretty(&candidates)?);
    }
    let lines: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(rank, c)| format!("{}. {}", rank + 1, c))
        .collect();
    Ok(lines.join("\n"))
}

fn cmd_patterns(
    opts: &InputOptions,
    file: Option<&Path>,
    min: usize,
    max: usize,
) -> Result<String> {
    if min == 0 || min > max {
        anyhow::bail!("Invalid pattern length range {}..={}", min, max);
    }
    let doc = load_document(opts, file)?;

    let mut out = Vec::new();
    for length in min..=max {
        let patterns = doc
            .find_repeating_patterns(length)
            .with_context(|| format!("Failed to extract patterns of length {}", length))?;
        out.push(format!("Length {}:", length));
        if patterns.is_empty() {
            out.push("  none".to_string());
        }
        for (pattern, offsets) in &patterns {
            out.push(format!("  {} -> positions {:?}", pattern, offsets));
        }
    }
    Ok(out.join("\n"))
}

fn cmd_decrypt(opts: &InputOptions, file: Option<&Path>, key: &str) -> Result<String> {
    let doc = load_document(opts, file)?;
    let key = Key::new(key, opts.language).context("Invalid key")?;
    decrypt_text(doc.text(), &key, opts.language).context("Decryption failed")
}

fn cmd_encrypt(opts: &InputOptions, file: Option<&Path>, key: &str) -> Result<String> {
    let plaintext = CiphertextDocument::normalize(&read_input(file)?, opts.strip);
    let key = Key::new(key, opts.language).context("Invalid key")?;
    encrypt(&plaintext, &key, opts.language).context("Encryption failed")
}

/// Defaults, then environment, then flags.
fn load_config(max_key_length: Option<usize>) -> Result<AnalysisConfig> {
    let config = AnalysisConfig::from_env().context("Invalid VIGENERE_* environment")?;
    Ok(match max_key_length {
        Some(max) => config.with_max_key_length(max),
        None => config,
    })
}

fn load_document(opts: &InputOptions, file: Option<&Path>) -> Result<CiphertextDocument> {
    let raw = read_input(file)?;
    CiphertextDocument::from_raw(&raw, opts.language, opts.strip).context("Ciphertext rejected")
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin"),
    }
}
