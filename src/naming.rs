//! Filename-derived names for comics.
//!
//! A comic's identity on the site comes entirely from its filename:
//!
//! - **Slug**: everything before the first `.`, e.g. `first-strip.png` → `first-strip`.
//!   Used for the page directory and URL.
//! - **Display name**: the slug with separators turned into spaces and the
//!   first letter capitalized, e.g. `first-strip` → `First strip`. Used on the
//!   index listing.
//!
//! Detail pages show the slug itself as the comic's name.

/// Characters treated as word separators in slugs.
const SEPARATORS: &[char] = &['-', '_'];

/// Slug for a comic filename: the text before the first `.`.
///
/// - `"first-strip.png"` → `"first-strip"`
/// - `"cat.final.jpg"` → `"cat"`
/// - `"README"` → `"README"`
pub fn slug(filename: &str) -> &str {
    match filename.split_once('.') {
        Some((stem, _)) => stem,
        None => filename,
    }
}

/// Listing name for a slug: separators become spaces, first letter upper-cased.
///
/// Only the first character changes case; the rest of the slug is kept as-is.
pub fn display_name(slug: &str) -> String {
    capitalize(&slug.replace(SEPARATORS, " "))
}

/// Upper-case the first character of `text`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_extension() {
        assert_eq!(slug("first-strip.png"), "first-strip");
    }

    #[test]
    fn slug_stops_at_first_dot() {
        assert_eq!(slug("cat.final.jpg"), "cat");
    }

    #[test]
    fn slug_without_extension_is_whole_name() {
        assert_eq!(slug("untitled"), "untitled");
    }

    #[test]
    fn display_name_joins_words() {
        assert_eq!(display_name("first-strip"), "First strip");
    }

    #[test]
    fn display_name_handles_underscores() {
        assert_eq!(display_name("late_night_snack"), "Late night snack");
    }

    #[test]
    fn display_name_keeps_inner_case() {
        assert_eq!(display_name("meet-NASA"), "Meet NASA");
    }

    #[test]
    fn display_name_keeps_doubled_separators() {
        assert_eq!(display_name("a--b"), "A  b");
    }

    #[test]
    fn capitalize_empty() {
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn capitalize_non_ascii() {
        assert_eq!(capitalize("émile"), "Émile");
    }

    #[test]
    fn capitalize_leading_digit_unchanged() {
        assert_eq!(capitalize("100 days"), "100 days");
    }
}
