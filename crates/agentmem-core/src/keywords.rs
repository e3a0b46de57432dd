use std::collections::BTreeSet;

/// Content tokens shorter than this (after stripping) are not indexed.
pub const MIN_CONTENT_KEYWORD_CHARS: usize = 3;

/// Derives the normalized keyword set for a record.
///
/// The set is the union of the lower-cased tags and every whitespace-delimited
/// content token, lower-cased and reduced to its alphanumeric characters, that
/// keeps at least [`MIN_CONTENT_KEYWORD_CHARS`] characters.
pub fn extract_keywords<S: AsRef<str>>(content: &str, tags: &[S]) -> BTreeSet<String> {
    let mut keywords = tags
        .iter()
        .map(|tag| tag.as_ref().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>();

    for word in content.to_lowercase().split_whitespace() {
        let cleaned = normalize_token(word);
        if cleaned.chars().count() >= MIN_CONTENT_KEYWORD_CHARS {
            keywords.insert(cleaned);
        }
    }

    keywords
}

fn normalize_token(word: &str) -> String {
    word.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_tokens_are_cleaned_and_filtered() {
        let keywords = extract_keywords::<&str>("Hello, World! an ok-ish C++ test.", &[]);
        let expected = ["hello", "okish", "test", "world"]
            .into_iter()
            .map(String::from)
            .collect::<BTreeSet<_>>();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn tags_are_lowercased_without_length_filter() {
        let keywords = extract_keywords("", &["Go", "RUST", ""]);
        assert!(keywords.contains("go"));
        assert!(keywords.contains("rust"));
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn unicode_letters_count_as_characters() {
        let keywords = extract_keywords::<&str>("Élan naïve café", &[]);
        assert!(keywords.contains("élan"));
        assert!(keywords.contains("naïve"));
        assert!(keywords.contains("café"));
    }
}
