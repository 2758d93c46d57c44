use crate::models::TagBag;

/// Derive the output base name (no extension) from tags.
/// Template is fixed to "artist - title"; a configurable template is a
/// possible later extension but is out of scope here.
///
/// Forbidden path characters are replaced so the result is always safe as a
/// file name on common filesystems. Unicode passes through untouched.
pub fn derive_name(tags: &TagBag) -> String {
    let artist = tags.first("artist").unwrap_or("Unknown Artist");
    let title = tags.first("title").unwrap_or("Untitled");
    let raw = format!("{} - {}", artist, title);

    raw.chars()
        .map(|c| match c {
            '<' | '>' | '/' | '\\' | '|' | '?' | '*' => '_',
            ':' => '-',
            '"' => '\'',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_artist_dash_title() {
        let mut tags = TagBag::new();
        tags.insert("artist", vec!["Air".into()]);
        tags.insert("title", vec!["La Femme d'Argent".into()]);
        assert_eq!(derive_name(&tags), "Air - La Femme d'Argent");
    }

    #[test]
    fn empty_bag_uses_fallbacks() {
        assert_eq!(derive_name(&TagBag::new()), "Unknown Artist - Untitled");
    }

    #[test]
    fn empty_value_list_counts_as_missing() {
        let mut tags = TagBag::new();
        tags.insert("artist", vec![]);
        tags.insert("title", vec!["Song".into()]);
        assert_eq!(derive_name(&tags), "Unknown Artist - Song");
    }

    #[test]
    fn multi_valued_fields_use_first_value() {
        let mut tags = TagBag::new();
        tags.insert("artist", vec!["First".into(), "Second".into()]);
        tags.insert("title", vec!["T".into()]);
        assert_eq!(derive_name(&tags), "First - T");
    }

    #[test]
    fn sanitizes_forbidden_characters() {
        let mut tags = TagBag::new();
        tags.insert("artist", vec!["AC/DC".into()]);
        tags.insert("title", vec!["\"T.N.T.\": a <live?> take*".into()]);
        let name = derive_name(&tags);
        assert_eq!(name, "AC_DC - 'T.N.T.'- a _live__ take_");
        for forbidden in ['<', '>', '/', '\\', '|', '?', '*', '"', ':'] {
            assert!(!name.contains(forbidden), "leaked {:?} in {:?}", forbidden, name);
        }
    }

    #[test]
    fn unicode_passes_through() {
        let mut tags = TagBag::new();
        tags.insert("artist", vec!["Sigur Rós".into()]);
        tags.insert("title", vec!["Svefn-g-englar".into()]);
        assert_eq!(derive_name(&tags), "Sigur Rós - Svefn-g-englar");
    }
}
