use crate::models::TagBag;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Tag source seam: the pipeline only needs "open file, get tag bag".
/// Implementations: LoftyTagSource (real), StaticTagSource (tests).
pub trait TagSource {
    /// Read the tags of an existing file. None means the file has no
    /// parseable tag container (or could not be probed at all); the caller
    /// must drop the asset, not abort the run.
    fn read(&self, path: &Path) -> Option<TagBag>;
}

/// Reads tags through lofty. ID3 and friends are normalized to key/value
/// access by lofty itself, so artist/title come back as plain item lookups.
pub struct LoftyTagSource;

impl TagSource for LoftyTagSource {
    fn read(&self, path: &Path) -> Option<TagBag> {
        use lofty::file::TaggedFileExt;
        use lofty::probe::read_from_path;
        use lofty::tag::{ItemKey, Tag};

        let tagged_file = match read_from_path(path) {
            Ok(tf) => tf,
            Err(_) => return None,
        };

        let tag: Option<Tag> = tagged_file
            .primary_tag()
            .cloned()
            .or_else(|| tagged_file.first_tag().cloned());

        let tag = match tag {
            Some(t) => t,
            None => return None,
        };

        let mut bag = TagBag::new();
        for (field, key) in [
            ("artist", ItemKey::TrackArtist),
            ("title", ItemKey::TrackTitle),
        ] {
            let values: Vec<String> = tag.get_strings(&key).map(|s| s.to_string()).collect();
            if !values.is_empty() {
                bag.insert(field, values);
            }
        }
        Some(bag)
    }
}

/// A deterministic tag source backed by a fixed path -> TagBag map.
/// Used in tests and useful for dry runs without real audio files.
#[derive(Default)]
pub struct StaticTagSource {
    entries: BTreeMap<PathBuf, TagBag>,
}

impl StaticTagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, tags: TagBag) {
        self.entries.insert(path.into(), tags);
    }
}

impl TagSource for StaticTagSource {
    fn read(&self, path: &Path) -> Option<TagBag> {
        self.entries.get(path).cloned()
    }
}
