use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Name of the preset to use, must be a key of `presets`.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Encoder executable prefixed onto the resolved preset command.
    #[serde(default = "default_encoder")]
    pub encoder: String,

    /// Preset name -> command template. Templates contain `$input` and
    /// exactly one `$output<ext>` occurrence (e.g. `$output.ogg`).
    #[serde(default = "default_presets")]
    pub presets: BTreeMap<String, String>,

    /// 0 = quiet, 1 = verbose, 2 = extra verbose.
    #[serde(default)]
    pub verbose: u8,

    /// Whether to write a rewritten .m3u8 next to the converted files.
    #[serde(default = "default_export_playlist")]
    pub export_playlist: bool,

    /// Supplementary flags appended when the chosen encoder matches a key
    /// ("don't overwrite", "quiet logging", ...).
    #[serde(default = "default_encoder_opts")]
    pub encoder_opts: BTreeMap<String, Vec<String>>,
}

fn default_out_dir() -> PathBuf { "converted".into() }
fn default_preset() -> String { "ogg".into() }
fn default_encoder() -> String { "ffmpeg".into() }
fn default_export_playlist() -> bool { true }

fn default_presets() -> BTreeMap<String, String> {
    let mut presets = BTreeMap::new();
    presets.insert(
        "ogg".to_string(),
        "-i $input -c:a libvorbis -qscale:a 6 $output.ogg".to_string(),
    );
    presets.insert(
        "opus".to_string(),
        "-i $input -c:a libopus -b:a 128k $output.opus".to_string(),
    );
    presets
}

fn default_encoder_opts() -> BTreeMap<String, Vec<String>> {
    let mut opts = BTreeMap::new();
    opts.insert(
        "ffmpeg".to_string(),
        vec!["-n".to_string(), "-loglevel".to_string(), "0".to_string()],
    );
    opts
}

impl Default for Config {
    fn default() -> Self {
        Config {
            out_dir: default_out_dir(),
            preset: default_preset(),
            encoder: default_encoder(),
            presets: default_presets(),
            verbose: 0,
            export_playlist: default_export_playlist(),
            encoder_opts: default_encoder_opts(),
        }
    }
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }
}
