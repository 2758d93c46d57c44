use crate::config::Config;
use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Matches `$output` immediately followed by a dot-prefixed alphanumeric
/// extension, e.g. `$output.opus`.
static OUTPUT_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$output(\.[a-zA-Z0-9]+)").expect("valid regex"));

/// A preset template resolved against the preset table, with its target
/// extension already extracted.
#[derive(Debug, Clone)]
pub struct ResolvedPreset {
    pub name: String,
    pub template: String,
    /// Target extension, dot-prefixed, e.g. ".opus".
    pub extension: String,
}

/// Look up `name` in the preset table and extract the target extension.
/// A missing preset or a template without a `$output.<ext>` pattern is a
/// configuration error; both abort the run before any conversion.
pub fn resolve(presets: &BTreeMap<String, String>, name: &str) -> Result<ResolvedPreset> {
    let template = presets
        .get(name)
        .ok_or_else(|| anyhow!("preset '{}' not found in the presets table", name))?;

    let extension = OUTPUT_EXT_RE
        .captures(template)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            anyhow!(
                "malformed preset '{}': no $output.<ext> pattern in template '{}'",
                name,
                template
            )
        })?;

    Ok(ResolvedPreset {
        name: name.to_string(),
        template: template.clone(),
        extension,
    })
}

/// POSIX-style form of a path, single-quoted for the shell. Derived names
/// routinely contain spaces (and apostrophes, via the `"` -> `'` rewrite),
/// so substituted paths must not be word-split. The quote closes right
/// before any `.ext` that follows `$output` in the template; the shell
/// joins the two into one word.
fn quoted_posix_path(path: &Path) -> String {
    let posix = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", posix.replace('\'', "'\\''"))
}

/// Build the full encoder command line for one asset: substitute `$input`
/// and `$output` (the extension stays in the template text right after
/// `$output`), prefix the encoder executable, and append any supplementary
/// flags configured for that encoder.
///
/// The result is a single shell string, kept for fidelity with existing
/// preset templates; paths from untrusted sources are still not safe inputs.
pub fn build_command(
    cfg: &Config,
    preset: &ResolvedPreset,
    input: &Path,
    output_base: &Path,
) -> String {
    let args = preset
        .template
        .replace("$input", &quoted_posix_path(input))
        .replace("$output", &quoted_posix_path(output_base));

    let mut command = format!("{} {}", cfg.encoder, args);
    if let Some(extra) = cfg.encoder_opts.get(&cfg.encoder) {
        for opt in extra {
            command.push(' ');
            command.push_str(opt);
        }
    }
    command
}
