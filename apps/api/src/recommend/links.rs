//! Link Synthesizer — derives the storefront search URL for a recommended
//! series or author from its name. Pure and deterministic; the step order
//! below is load-bearing.

use url::form_urlencoded;

/// Storefront search endpoint.
pub const SEARCH_BASE_URL: &str = "https://www.justbookify.com/search";

/// Query suffix requesting last-word prefix matching.
const SEARCH_OPTIONS_SUFFIX: &str = "options%5Bprefix%5D=last";

/// Tokens that add noise to storefront search queries.
const GENERIC_SUFFIXES: [&str; 5] = ["comics", "books", "series", "collection", "novels"];

/// Substring markers stripped from names, longest-specific first.
const SERIES_MARKERS: [&str; 4] = [" series name", "series name", " series", "series"];

/// Normalizes a series/author name into a storefront query term.
///
/// Steps, in order: lowercase; strip the series markers; collapse
/// whitespace; fall back to the lowercased original when stripping emptied
/// the name; drop generic-suffix tokens, falling back to the pre-filter
/// string when that empties it too.
pub fn normalized_query_term(series_name: &str) -> String {
    let lowered = series_name.to_lowercase();

    let mut stripped = lowered.clone();
    for marker in SERIES_MARKERS {
        stripped = stripped.replace(marker, "");
    }

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = if collapsed.is_empty() {
        lowered.trim().to_string()
    } else {
        collapsed
    };

    let filtered = cleaned
        .split_whitespace()
        .filter(|token| !GENERIC_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ");

    if filtered.is_empty() {
        cleaned
    } else {
        filtered
    }
}

/// Builds the full storefront search link for a series/author name.
pub fn synthesize_link(series_name: &str) -> String {
    let term: String =
        form_urlencoded::byte_serialize(normalized_query_term(series_name).as_bytes()).collect();
    format!("{SEARCH_BASE_URL}?q={term}&{SEARCH_OPTIONS_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_series_suffix() {
        assert_eq!(normalized_query_term("Mysteries Series"), "mysteries");
    }

    #[test]
    fn test_mysteries_series_collection_token_walk() {
        // " series" removal leaves "the mysteries collection"; the token
        // filter then drops "collection".
        assert_eq!(
            normalized_query_term("The Mysteries Series Collection"),
            "the mysteries"
        );
    }

    #[test]
    fn test_harry_potter_series_collection() {
        assert_eq!(
            normalized_query_term("Harry Potter Series Collection"),
            "harry potter"
        );
    }

    #[test]
    fn test_series_name_marker_takes_precedence() {
        assert_eq!(
            normalized_query_term("Dragon Masters Series Name"),
            "dragon masters"
        );
    }

    #[test]
    fn test_name_that_is_only_series_falls_back() {
        // Stripping empties the name; the lowercased original survives the
        // token-filter fallback as well.
        assert_eq!(normalized_query_term("Series"), "series");
    }

    #[test]
    fn test_generic_suffix_tokens_dropped() {
        assert_eq!(normalized_query_term("Boxcar Children Books"), "boxcar children");
        assert_eq!(normalized_query_term("Tintin Comics"), "tintin");
        assert_eq!(normalized_query_term("Redwall Novels"), "redwall");
    }

    #[test]
    fn test_plain_author_name_passes_through() {
        assert_eq!(normalized_query_term("Roald Dahl"), "roald dahl");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(
            normalized_query_term("  The   Last  Kids  "),
            "the last kids"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for name in [
            "The Mysteries Series Collection",
            "Harry Potter Series Collection",
            "Roald Dahl",
            "Series",
            "Boxcar Children Books",
        ] {
            let once = normalized_query_term(name);
            assert_eq!(normalized_query_term(&once), once, "unstable for {name}");
        }
    }

    #[test]
    fn test_link_uses_fixed_template() {
        assert_eq!(
            synthesize_link("The Mysteries Series Collection"),
            "https://www.justbookify.com/search?q=the+mysteries&options%5Bprefix%5D=last"
        );
    }

    #[test]
    fn test_link_encodes_reserved_characters() {
        let link = synthesize_link("Diary of an 8-bit & Friends");
        assert!(link.starts_with("https://www.justbookify.com/search?q="));
        assert!(link.contains("%26"));
        assert!(link.ends_with("&options%5Bprefix%5D=last"));
    }
}
