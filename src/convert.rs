use crate::config::Config;
use crate::models::{Action, AudioAsset, ConversionResult, Outcome};
use crate::naming::derive_name;
use crate::preset::{build_command, ResolvedPreset};
use anyhow::{bail, Context, Result};
use filetime::FileTime;
use std::process::ExitStatus;
use tracing::{debug, info, warn};

/// Source format that is never re-encoded: already lossy and accepted
/// everywhere, so it is copied as-is.
pub const PASSTHROUGH_EXT: &str = ".mp3";

/// Pick the action for one asset from extensions and output existence alone.
/// Format equality short-circuits everything else, including an existing
/// output under the target extension; the check is never content-based.
pub fn decide(source_ext: &str, target_ext: &str, output_exists: bool) -> Action {
    if source_ext == PASSTHROUGH_EXT || source_ext == target_ext {
        Action::Copy
    } else if output_exists {
        Action::SkipExisting
    } else {
        Action::Encode
    }
}

/// Run a fully assembled command line through the shell and return its exit
/// status. Output streams are inherited, not captured; only the status is
/// inspected. The subprocess blocks the pipeline until it exits.
pub fn run_command(command: &str) -> Result<ExitStatus> {
    debug!("running: {}", command);
    std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .with_context(|| format!("spawning encoder command '{}'", command))
}

/// Convert a single asset into `cfg.out_dir`: copy, skip, or encode.
///
/// Encoder failures are reported in the result, not returned as errors; a
/// failed encode may leave a partial output file behind, which a later run
/// will see as already converted. Only I/O errors on the copy path (and the
/// unimplemented overwrite mode) surface as hard errors.
pub fn convert_asset(
    cfg: &Config,
    preset: &ResolvedPreset,
    asset: &AudioAsset,
    overwrite: bool,
) -> Result<ConversionResult> {
    let base = derive_name(&asset.tags);
    let output_base = cfg.out_dir.join(&base);
    let target_path = cfg.out_dir.join(format!("{}{}", base, preset.extension));

    let action = decide(&asset.ext, &preset.extension, target_path.exists());

    match action {
        Action::Copy => {
            let file_name = format!("{}{}", base, asset.ext);
            let dest = cfg.out_dir.join(&file_name);
            std::fs::copy(&asset.path, &dest).with_context(|| {
                format!("copying {} to {}", asset.path.display(), dest.display())
            })?;
            // fs::copy carries permissions only; timestamps are cloned
            // separately so the copy keeps the source's atime/mtime
            let meta = std::fs::metadata(&asset.path)
                .with_context(|| format!("reading metadata of {}", asset.path.display()))?;
            let atime = FileTime::from_last_access_time(&meta);
            let mtime = FileTime::from_last_modification_time(&meta);
            filetime::set_file_times(&dest, atime, mtime)
                .with_context(|| format!("setting timestamps on {}", dest.display()))?;
            if cfg.verbose > 0 {
                info!("\t{} copied", file_name);
            }
            Ok(ConversionResult { file_name, outcome: Outcome::Copied })
        }
        _ if overwrite => {
            bail!("forced overwrite is not implemented");
        }
        Action::SkipExisting => {
            let file_name = format!("{}{}", base, preset.extension);
            if cfg.verbose > 0 {
                info!("\t{} already exists, skipping conversion", file_name);
            }
            Ok(ConversionResult { file_name, outcome: Outcome::SkippedExisting })
        }
        Action::Encode => {
            let file_name = format!("{}{}", base, preset.extension);
            let command = build_command(cfg, preset, &asset.path, &output_base);
            let status = run_command(&command)?;
            if status.success() {
                if cfg.verbose > 0 {
                    info!("\t{} converted", file_name);
                }
                Ok(ConversionResult { file_name, outcome: Outcome::Encoded })
            } else {
                if cfg.verbose > 0 {
                    warn!(
                        "failed to convert {} with preset {} (exit: {:?})",
                        asset.path.display(),
                        preset.name,
                        status.code()
                    );
                }
                Ok(ConversionResult { file_name, outcome: Outcome::Failed })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagBag;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs<F: FnOnce()>(f: F) -> String {
        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let buf = writer.0.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn encoder_failure_report_is_gated_on_verbosity() {
        let td = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.out_dir = td.path().to_path_buf();
        cfg.encoder = "false".into();
        cfg.presets.insert("ogg".into(), "$input $output.ogg".into());
        let preset = crate::preset::resolve(&cfg.presets, "ogg").unwrap();
        let asset = AudioAsset::new("in.flac".into(), TagBag::new());

        // quiet mode: the failure shows up in the outcome, not the log
        let quiet = capture_logs(|| {
            let r = convert_asset(&cfg, &preset, &asset, false).unwrap();
            assert_eq!(r.outcome, Outcome::Failed);
        });
        assert!(!quiet.contains("failed to convert"), "unexpected log: {}", quiet);

        cfg.verbose = 1;
        let loud = capture_logs(|| {
            let r = convert_asset(&cfg, &preset, &asset, false).unwrap();
            assert_eq!(r.outcome, Outcome::Failed);
        });
        assert!(loud.contains("failed to convert"), "missing report: {}", loud);
    }

    #[test]
    fn passthrough_always_copies() {
        assert_eq!(decide(".mp3", ".ogg", false), Action::Copy);
        assert_eq!(decide(".mp3", ".ogg", true), Action::Copy);
    }

    #[test]
    fn same_format_always_copies() {
        assert_eq!(decide(".ogg", ".ogg", false), Action::Copy);
        assert_eq!(decide(".ogg", ".ogg", true), Action::Copy);
    }

    #[test]
    fn existing_output_skips() {
        assert_eq!(decide(".flac", ".ogg", true), Action::SkipExisting);
    }

    #[test]
    fn otherwise_encode() {
        assert_eq!(decide(".flac", ".ogg", false), Action::Encode);
        assert_eq!(decide("", ".ogg", false), Action::Encode);
    }
}
