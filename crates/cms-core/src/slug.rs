// ABOUTME: Pure slug derivation from free-form titles.
// ABOUTME: Collection-level uniqueness is handled by the store's SlugResolver, not here.

/// Derive a URL-safe slug from `text`.
///
/// The input is lowercased, every maximal run of characters outside
/// `[a-z0-9]` becomes a single hyphen, and leading/trailing hyphens are
/// stripped. The result is empty when the input has no ASCII alphanumerics,
/// so callers must supply their own fallback.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Build the candidate probed on the `attempt`-th collision. Attempt 1 is the
/// base slug itself; later attempts get `-2`, `-3`, ...
pub fn suffixed(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Goa: Beaches & Nightlife!"), "goa-beaches-nightlife");
    }

    #[test]
    fn slugify_all_punctuation_is_empty() {
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("  !!  "), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_strips_edges_and_keeps_digits() {
        assert_eq!(slugify("  Manali Adventure  "), "manali-adventure");
        assert_eq!(slugify("--7 Days in Kerala--"), "7-days-in-kerala");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Déjà Vu"), "caf-d-j-vu");
        assert_eq!(slugify("Ladakh_Road Trip"), "ladakh-road-trip");
    }

    #[test]
    fn suffixed_starts_numbering_at_two() {
        assert_eq!(suffixed("kerala-backwaters", 1), "kerala-backwaters");
        assert_eq!(suffixed("kerala-backwaters", 2), "kerala-backwaters-2");
        assert_eq!(suffixed("kerala-backwaters", 3), "kerala-backwaters-3");
    }
}
