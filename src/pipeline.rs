use crate::config::Config;
use crate::convert::convert_asset;
use crate::metadata::TagSource;
use crate::models::AudioAsset;
use crate::preset::{self, ResolvedPreset};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read a playlist file into an ordered list of entry paths.
/// One path per line; blank lines and `#` comment lines (M3U headers) are
/// ignored. Entries are not deduplicated and keep their order.
pub fn read_entries(playlist: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(playlist)
        .with_context(|| format!("opening playlist {}", playlist.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("reading playlist {}", playlist.display()))?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(PathBuf::from(line));
    }
    Ok(entries)
}

/// Resolve playlist entries to assets: existence check, then tag read.
/// Entries that fail either step are dropped with a log line; they never
/// abort the playlist.
fn load_assets(cfg: &Config, tags: &dyn TagSource, entries: &[PathBuf]) -> Vec<AudioAsset> {
    let mut assets = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.exists() {
            if cfg.verbose > 0 {
                info!("file not found: {}", entry.display());
            }
            continue;
        }
        match tags.read(entry) {
            Some(bag) => assets.push(AudioAsset::new(entry.clone(), bag)),
            None => {
                if cfg.verbose > 0 {
                    info!("no readable tags, dropping: {}", entry.display());
                }
            }
        }
    }
    assets
}

fn export_playlist_path(cfg: &Config, playlist: &Path) -> PathBuf {
    let stem = playlist
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("playlist");
    cfg.out_dir.join(format!("{}.m3u8", stem))
}

/// Process one playlist end to end: load assets, convert each in order,
/// and (when export is enabled) append one output filename per processed
/// asset to the rewritten playlist.
pub fn process_playlist(
    cfg: &Config,
    preset: &ResolvedPreset,
    tags: &dyn TagSource,
    playlist: &Path,
) -> Result<()> {
    let entries = read_entries(playlist)?;
    let assets = load_assets(cfg, tags, &entries);

    if cfg.verbose > 0 {
        info!(
            "treating: {} ({} of {} entries resolved)",
            playlist.display(),
            assets.len(),
            entries.len()
        );
    }

    let export_path = export_playlist_path(cfg, playlist);
    // A stale export from an earlier run is truncated before processing;
    // a pre-existing file with any other name is left untouched.
    if cfg.export_playlist && export_path.exists() {
        std::fs::File::create(&export_path)
            .with_context(|| format!("truncating former playlist {}", export_path.display()))?;
        if cfg.verbose > 0 {
            info!("deleting former playlist file: {}", export_path.display());
        }
    }

    for asset in &assets {
        let result = match convert_asset(cfg, preset, asset, false) {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping {}: {:#}", asset.path.display(), e);
                continue;
            }
        };
        debug!("{} -> {} ({:?})", asset.path.display(), result.file_name, result.outcome);

        if cfg.export_playlist {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&export_path)
                .with_context(|| format!("opening playlist {}", export_path.display()))?;
            writeln!(file, "{}", result.file_name)?;
        }
    }

    if cfg.export_playlist && cfg.verbose > 0 {
        info!("written: {}", export_path.display());
    }
    Ok(())
}

/// Run the whole batch. Only setup errors (output directory creation,
/// preset resolution) are fatal; each playlist is otherwise isolated.
pub fn run(cfg: &Config, tags: &dyn TagSource, playlists: &[PathBuf]) -> Result<()> {
    if !cfg.out_dir.exists() {
        std::fs::create_dir_all(&cfg.out_dir)
            .with_context(|| format!("creating output directory {}", cfg.out_dir.display()))?;
    }

    let preset = preset::resolve(&cfg.presets, &cfg.preset)
        .context("resolving configured preset")?;

    for playlist in playlists {
        if let Err(e) = process_playlist(cfg, &preset, tags, playlist) {
            warn!("playlist {} failed: {:#}", playlist.display(), e);
        }
    }

    if cfg.verbose > 0 {
        info!("done");
    }
    Ok(())
}
