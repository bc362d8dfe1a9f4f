//! keyrhythm CLI
//!
//! Capture a typing rhythm, compare it with stored profiles, save it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use keyrhythm::{
    collector::{self, describe_key},
    config::Config,
    core::{best_match, build_profile, compare_profiles, rank_profiles, Profile},
    store::{LoadReport, ProfileStore},
    VERSION,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Prompt for the identity label when none is given.
const LABEL_PROMPT: &str = "who are you ? ";

#[derive(Parser)]
#[command(name = "keyrhythm")]
#[command(version = VERSION)]
#[command(about = "Keystroke-rhythm typing profiles", long_about = None)]
struct Cli {
    /// Directory holding profile_<label>.txt files
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Longest gap (seconds) between presses that still counts as rhythm
    #[arg(long, global = true)]
    timeout: Option<f64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a typing sample, compare it with stored profiles and save it
    Enroll {
        /// Label to save the profile under (prompted for if omitted)
        #[arg(long, short)]
        name: Option<String>,
    },

    /// List stored profiles
    List,

    /// Print the key pairs of a stored profile
    Show {
        /// Profile label
        label: String,
    },

    /// Score two stored profiles against each other
    Compare {
        /// First profile label
        lhs: String,
        /// Second profile label
        rhs: String,
    },

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()
        .context("Could not load configuration")?
        .with_overrides(cli.dir, cli.timeout)?;

    match cli.command.unwrap_or(Commands::Enroll { name: None }) {
        Commands::Enroll { name } => cmd_enroll(&config, name),
        Commands::List => cmd_list(&config),
        Commands::Show { label } => cmd_show(&config, &label),
        Commands::Compare { lhs, rhs } => cmd_compare(&config, &lhs, &rhs),
        Commands::Config => cmd_config(&config),
    }
}

fn cmd_enroll(config: &Config, name: Option<String>) -> Result<()> {
    let store = ProfileStore::new(&config.profile_dir);

    let mut stdout = io::stdout();
    let events = collector::capture_from_terminal(&mut stdout, config.exit_key)
        .context("Keystroke capture failed")?;
    let profile = build_profile(&events, config.timeout);
    tracing::info!(keys = events.len(), pairs = profile.len(), "captured sample");

    if profile.is_empty() {
        eprintln!("Warning: no key pairs were typed within the timeout; the profile is empty");
    }

    match store.load_all() {
        Ok(report) => print_matches(&mut stdout, &profile, &report)?,
        Err(e) => eprintln!("Warning: Could not load stored profiles: {e}"),
    }

    let label = match name {
        Some(label) => label,
        None => {
            let stdin = io::stdin();
            read_label(&mut stdin.lock(), &mut stdout)?
        }
    };

    let path = store
        .save(&label, &profile)
        .context("Could not save profile")?;
    println!("Saved profile to {}", path.display());
    Ok(())
}

/// Write one `<filename> <score>` line per stored profile, closest first.
///
/// Skipped files were already logged by [`ProfileStore::load_all`].
fn print_matches<W: Write>(out: &mut W, profile: &Profile, report: &LoadReport) -> Result<()> {
    let ranked = rank_profiles(
        profile,
        report
            .profiles
            .iter()
            .map(|stored| (stored.name.as_str(), &stored.profile)),
    );

    for m in &ranked {
        match &m.score {
            Ok(score) => writeln!(out, "{} {}", m.name, score)?,
            Err(e) => writeln!(out, "{} {}", m.name, e)?,
        }
    }

    if let Some(best) = best_match(&ranked) {
        writeln!(out, "Closest match: {}", best.name)?;
    }
    Ok(())
}

/// Prompt until a usable label is entered.
fn read_label<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    loop {
        write!(out, "{LABEL_PROMPT}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("No name given; profile not saved");
        }

        let label = line.trim_end_matches(['\r', '\n']);
        match keyrhythm::store::validate_label(label) {
            Ok(()) => return Ok(label.to_string()),
            Err(e) => writeln!(out, "{e}")?,
        }
    }
}

fn cmd_list(config: &Config) -> Result<()> {
    let store = ProfileStore::new(&config.profile_dir);
    let report = store.load_all()?;

    if report.profiles.is_empty() {
        println!("No profiles found in {}", store.dir().display());
        return Ok(());
    }

    for stored in &report.profiles {
        println!("{}  {} key pairs", stored.name, stored.profile.len());
    }
    Ok(())
}

fn cmd_show(config: &Config, label: &str) -> Result<()> {
    let store = ProfileStore::new(&config.profile_dir);
    let stored = store.load_label(label)?;

    println!("{} ({} key pairs)", stored.path.display(), stored.profile.len());
    for (pair, latency) in stored.profile.pairs() {
        println!(
            "  {:>12} -> {:<12} {:.6}s",
            describe_key(pair.prev),
            describe_key(pair.cur),
            latency
        );
    }
    Ok(())
}

fn cmd_compare(config: &Config, lhs: &str, rhs: &str) -> Result<()> {
    let store = ProfileStore::new(&config.profile_dir);
    let left = store.load_label(lhs)?;
    let right = store.load_label(rhs)?;

    match compare_profiles(&left.profile, &right.profile) {
        Ok(score) => println!("{} {} {}", left.name, right.name, score),
        Err(e) => println!("{} {} {}", left.name, right.name, e),
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyrhythm::{
        core::KeyPair,
        store::{StoreError, StoredProfile},
    };

    #[test]
    fn test_read_label() {
        let mut input = io::Cursor::new("alice\n");
        let mut out = Vec::new();
        assert_eq!(read_label(&mut input, &mut out).unwrap(), "alice");
        assert_eq!(String::from_utf8(out).unwrap(), LABEL_PROMPT);
    }

    #[test]
    fn test_read_label_reprompts_on_invalid() {
        let mut input = io::Cursor::new("\n../x\nbob\r\n");
        let mut out = Vec::new();
        assert_eq!(read_label(&mut input, &mut out).unwrap(), "bob");
        assert_eq!(
            String::from_utf8(out).unwrap().matches(LABEL_PROMPT).count(),
            3
        );
    }

    fn stored(name: &str, entries: &[((u32, u32), f64)]) -> StoredProfile {
        StoredProfile {
            path: PathBuf::from(name),
            name: name.to_string(),
            profile: entries
                .iter()
                .map(|&((a, b), v)| (KeyPair::new(a, b), v))
                .collect(),
        }
    }

    #[test]
    fn test_print_matches_format() {
        let sample: Profile = [(KeyPair::new(97, 98), 0.5)].into_iter().collect();
        let report = LoadReport {
            profiles: vec![
                stored("profile_carol.txt", &[((120, 121), 0.1)]),
                stored("profile_alice.txt", &[((97, 98), 0.25), ((98, 99), 0.2)]),
            ],
            skipped: Vec::new(),
        };

        let mut out = Vec::new();
        print_matches(&mut out, &sample, &report).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "profile_alice.txt 0.0625\n\
             profile_carol.txt incomparable (no shared key pairs)\n\
             Closest match: profile_alice.txt\n"
        );
    }

    #[test]
    fn test_print_matches_leaves_skipped_files_to_the_log() {
        let sample: Profile = [(KeyPair::new(97, 98), 0.5)].into_iter().collect();
        let report = LoadReport {
            profiles: vec![stored("profile_carol.txt", &[((120, 121), 0.1)])],
            skipped: vec![StoreError::Decode {
                path: PathBuf::from("profile_broken.txt"),
                reason: "expected value".to_string(),
            }],
        };

        let mut out = Vec::new();
        print_matches(&mut out, &sample, &report).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "profile_carol.txt incomparable (no shared key pairs)\n"
        );
    }

    #[test]
    fn test_read_label_eof() {
        let mut input = io::Cursor::new("");
        let mut out = Vec::new();
        assert!(read_label(&mut input, &mut out).is_err());
    }

    #[test]
    fn test_cli_defaults_to_enroll() {
        let cli = Cli::parse_from(["keyrhythm"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["keyrhythm", "--timeout", "0.5", "list"]);
        assert_eq!(cli.timeout, Some(0.5));
        assert!(matches!(cli.command, Some(Commands::List)));
    }
}
