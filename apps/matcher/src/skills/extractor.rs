//! Skill Extractor: finds catalog skills in free text.
//!
//! Single-word skills are matched against word tokens; phrase skills ("Machine Learning",
//! "C++") are searched in the lowercased text, anchored on word boundaries.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::catalog::SkillCatalog;
use super::stopwords::is_stopword;

pub struct SkillExtractor {
    catalog: Arc<SkillCatalog>,
}

impl SkillExtractor {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self { catalog }
    }

    /// Canonical names of every catalog skill present in `text`. Never fails; no matches
    /// yields an empty set.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        if text.trim().is_empty() {
            return found;
        }

        for token in tokenize(text) {
            if let Some(skill) = self.catalog.lookup_token(&token) {
                found.insert(skill.to_string());
            }
        }

        let lowered = text.to_lowercase();
        for (phrase, skill) in self.catalog.phrases() {
            if contains_phrase(&lowered, phrase) {
                found.insert(skill.to_string());
            }
        }

        found
    }
}

/// Lowercased alphabetic word tokens with stopwords removed. Digits and punctuation
/// never survive.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .map(String::from)
        .collect()
}

/// True when `phrase` occurs in `haystack` with no alphanumeric character directly
/// before or after it. Both arguments are expected lowercase.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::catalog::default_categories;

    fn extractor() -> SkillExtractor {
        SkillExtractor::new(Arc::new(SkillCatalog::new(default_categories())))
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_languages_and_frameworks() {
        let found = extractor().extract("Experience with Python, JavaScript, and React for 5 years");
        assert_eq!(found, set(&["Python", "JavaScript", "React"]));
    }

    #[test]
    fn test_tokenize_drops_stopwords_digits_and_punctuation() {
        let tokens = tokenize("Experience with Python, JavaScript, and React for 5 years");
        assert_eq!(tokens, vec!["experience", "python", "javascript", "react", "years"]);
        assert!(!tokens.iter().any(|t| t == "with" || t == "and" || t == "for"));
        assert!(!tokens.iter().any(|t| t.chars().any(|c| !c.is_alphabetic())));
    }

    #[test]
    fn test_multi_word_and_punctuated_skills() {
        let found = extractor().extract(
            "Built Machine Learning services in C++ and Node.js, shipped via CI/CD to Google Cloud.",
        );
        assert_eq!(
            found,
            set(&["Machine Learning", "C++", "Node.js", "CI/CD", "Google Cloud"])
        );
    }

    #[test]
    fn test_matching_is_case_insensitive_and_canonical() {
        let found = extractor().extract("POSTGRESQL, docker and KUBERNETES");
        assert_eq!(found, set(&["PostgreSQL", "Docker", "Kubernetes"]));
    }

    #[test]
    fn test_phrase_requires_word_boundaries() {
        let found = extractor().extract("Ran the big database migration; wrote a Big Datastore");
        assert!(!found.contains("Big Data"));
        let found = extractor().extract("Big Data pipelines");
        assert!(found.contains("Big Data"));
    }

    #[test]
    fn test_phrase_and_token_overlap() {
        // "SQL Server" also contains the single-word skill "SQL".
        let found = extractor().extract("Administered SQL Server clusters");
        assert_eq!(found, set(&["SQL", "SQL Server"]));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "Rust, Go, AWS, Terraform and Deep Learning";
        let ex = extractor();
        assert_eq!(ex.extract(text), ex.extract(text));
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extractor().extract("").is_empty());
        assert!(extractor().extract("   \n").is_empty());
        assert!(extractor().extract("Nothing relevant here at all").is_empty());
    }

    #[test]
    fn test_contains_phrase_at_edges() {
        assert!(contains_phrase("machine learning", "machine learning"));
        assert!(contains_phrase("(c++)", "c++"));
        assert!(!contains_phrase("xmachine learning", "machine learning"));
        assert!(!contains_phrase("machine learnings", "machine learning"));
    }
}
