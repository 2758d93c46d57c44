use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

use plconv as lib;
use lib::config::Config;
use lib::metadata::LoftyTagSource;

#[derive(Parser)]
#[command(name = "plconv", version, about = "Convert playlists of audio files via configurable encoder presets")]
struct Cli {
    /// Paths to playlists to convert
    #[arg(required = true)]
    playlists: Vec<PathBuf>,

    /// Path to config TOML (default: ./config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long = "out_dir")]
    out_dir: Option<PathBuf>,

    /// Specify the preset.
    #[arg(long)]
    preset: Option<String>,

    /// Specify the encoder. The preset must match the encoder!
    #[arg(long)]
    encoder: Option<String>,

    /// Verbosity
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Extra verbosity (spelled --v2, or --extra_verbose)
    #[arg(long = "v2", alias = "extra_verbose")]
    extra_verbose: bool,

    /// Skip the playlist export
    #[arg(long = "no_playlists", conflicts_with = "export_playlists")]
    no_playlists: bool,

    /// Export the conversion playlist
    #[arg(long = "export_playlists")]
    export_playlists: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve config path: explicit --config overrides; otherwise pick up a
    // ./config.toml for local usage and fall back to built-in defaults.
    let mut cfg = match &cli.config {
        Some(p) => Config::from_path(p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => {
            let local = Path::new("config.toml");
            if local.exists() {
                Config::from_path(local)
                    .with_context(|| format!("loading config from {}", local.display()))?
            } else {
                Config::default()
            }
        }
    };

    // CLI flags overrule the file-level configuration.
    if let Some(out_dir) = cli.out_dir {
        cfg.out_dir = out_dir;
    }
    if let Some(encoder) = cli.encoder {
        cfg.encoder = encoder;
    }
    if let Some(preset) = cli.preset {
        cfg.preset = preset;
    }
    if cli.verbose {
        cfg.verbose = 1;
    }
    if cli.extra_verbose {
        cfg.verbose = 2;
    }
    if cli.no_playlists {
        cfg.export_playlist = false;
    }
    if cli.export_playlists {
        cfg.export_playlist = true;
    }

    // Bridge lofty's `log` records into tracing, then log to stdout.
    // RUST_LOG wins when set; otherwise -v/-v2 pick the level.
    let _ = LogTracer::init();
    let default_level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set global tracing subscriber");

    // Nonexistent playlist arguments are reported up front and skipped.
    let (playlists, missing): (Vec<PathBuf>, Vec<PathBuf>) =
        cli.playlists.into_iter().partition(|p| p.exists());
    for p in &missing {
        eprintln!("{} not found", p.display());
    }

    lib::pipeline::run(&cfg, &LoftyTagSource, &playlists)
        .with_context(|| "running conversion pipeline".to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_flags_are_mutually_exclusive() {
        let parsed = Cli::try_parse_from([
            "plconv",
            "list.m3u",
            "--no_playlists",
            "--export_playlists",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn playlists_are_required() {
        assert!(Cli::try_parse_from(["plconv"]).is_err());
    }

    #[test]
    fn verbosity_flags_parse() {
        let cli = Cli::try_parse_from(["plconv", "-v", "a.m3u"]).unwrap();
        assert!(cli.verbose && !cli.extra_verbose);
        let cli = Cli::try_parse_from(["plconv", "--v2", "a.m3u"]).unwrap();
        assert!(cli.extra_verbose);
        let cli = Cli::try_parse_from(["plconv", "--extra_verbose", "a.m3u"]).unwrap();
        assert!(cli.extra_verbose);
    }
}
