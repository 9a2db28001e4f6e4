use crate::types::{ClassificationResult, Result};
use regex::Regex;
use tracing::debug;

/// Regex tier: model names, acronyms, and domain phrases, word-boundary
/// anchored and case-insensitive.
const GENAI_PATTERNS: [&str; 7] = [
    r"(?i)\b(gpt-?\d+|chatgpt|claude|dall-?e|midjourney)\b",
    r"(?i)\b(large language model|llm)s?\b",
    r"(?i)\b(neural network|transformer|diffusion)\b",
    r"(?i)\b(text generation|image generation|content generation)\b",
    r"(?i)\b(artificial intelligence|machine learning)\b",
    r"(?i)\b(natural language processing|nlp)\b",
    r"(?i)\b(generative\s+ai|genai)\b",
];

/// Broader AI/ML indicators consulted when the keyword tiers alone are
/// inconclusive.
const CONTEXT_INDICATORS: [&str; 9] = [
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural",
    "algorithm",
    "model training",
    "language model",
    "computer vision",
    "natural language",
];

/// Rule-based classifier scoring free text for generative-AI relatedness.
/// Pure and deterministic for a given keyword configuration.
pub struct GenAiClassifier {
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl GenAiClassifier {
    pub fn new(keywords: Vec<String>) -> Result<Self> {
        let patterns = GENAI_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        Ok(Self { keywords, patterns })
    }

    /// Boolean verdict on whether `text` concerns generative-AI topics.
    pub fn is_related(&self, text: &str) -> bool {
        self.classify(text).related
    }

    /// Full classification with evidence counts. Decision tiers, first
    /// match wins:
    /// 1. >= 3 keyword hits or >= 2 pattern hits,
    /// 2. >= 1 keyword hit and (density above threshold or a pattern hit),
    /// 3. >= 3 context indicators alongside a keyword hit.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        if text.is_empty() {
            return ClassificationResult {
                related: false,
                keyword_matches: 0,
                pattern_matches: 0,
                context_matches: 0,
            };
        }

        let lower = text.to_lowercase();

        let keyword_matches = self
            .keywords
            .iter()
            .filter(|keyword| lower.contains(keyword.as_str()))
            .count();

        // Density against 1 when the text has length but no words.
        let word_count = text.split_whitespace().count();
        let density = keyword_matches as f64 / word_count.max(1) as f64;

        let pattern_matches = self
            .patterns
            .iter()
            .filter(|pattern| pattern.is_match(&lower))
            .count();

        let context_matches = CONTEXT_INDICATORS
            .iter()
            .filter(|indicator| lower.contains(*indicator))
            .count();

        let related = if keyword_matches >= 3 || pattern_matches >= 2 {
            debug!(
                keyword_matches,
                pattern_matches, "High confidence GenAI content detected"
            );
            true
        } else if keyword_matches >= 1 && (density > 0.001 || pattern_matches >= 1) {
            debug!(
                keyword_matches,
                pattern_matches, "Medium confidence GenAI content detected"
            );
            true
        } else if context_matches >= 3 && keyword_matches >= 1 {
            debug!(
                context_matches,
                keyword_matches, "Context-based GenAI content detected"
            );
            true
        } else {
            debug!(
                keyword_matches,
                pattern_matches, context_matches, "Content not classified as GenAI"
            );
            false
        };

        ClassificationResult {
            related,
            keyword_matches,
            pattern_matches,
            context_matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_keywords;

    fn classifier() -> GenAiClassifier {
        GenAiClassifier::new(default_keywords()).unwrap()
    }

    #[test]
    fn empty_text_is_not_related() {
        assert!(!classifier().is_related(""));
    }

    #[test]
    fn three_keywords_are_high_confidence() {
        let text = "The bank rolled out generative ai assistants built on gpt \
                    technology, a chatgpt-style interface for analysts.";
        let result = classifier().classify(text);
        assert!(result.keyword_matches >= 3);
        assert!(result.related);
    }

    #[test]
    fn two_patterns_are_high_confidence() {
        // "neural network" and "nlp" hit the pattern tier even with the
        // keyword list emptied down to an unrelated term.
        let classifier = GenAiClassifier::new(vec!["quantum".to_string()]).unwrap();
        let text = "A neural network approach to nlp tasks.";
        let result = classifier.classify(text);
        assert!(result.pattern_matches >= 2);
        assert!(result.related);
    }

    #[test]
    fn single_keyword_with_low_density_is_not_related() {
        // One keyword ("deep learning"), diluted past the density threshold,
        // no pattern hits, fewer than three context indicators.
        let filler = "word ".repeat(1200);
        let text = format!("deep learning {}", filler);
        let result = classifier().classify(&text);
        assert_eq!(result.keyword_matches, 1);
        assert_eq!(result.pattern_matches, 0);
        assert!(result.context_matches < 3);
        assert!(!result.related);
    }

    #[test]
    fn single_keyword_with_high_density_is_related() {
        let result = classifier().classify("chatgpt");
        assert_eq!(result.keyword_matches, 2); // "chatgpt" contains "gpt"
        assert!(result.related);
    }

    #[test]
    fn context_tier_catches_indirect_mentions() {
        let classifier = GenAiClassifier::new(vec!["deep learning".to_string()]).unwrap();
        let filler = "word ".repeat(1200);
        let text = format!(
            "deep learning systems rely on model training and computer vision {}",
            filler
        );
        let result = classifier.classify(&text);
        assert_eq!(result.pattern_matches, 0);
        assert!(result.context_matches >= 3);
        assert!(result.related);
    }

    #[test]
    fn whitespace_only_text_counts_words_as_one() {
        // No panic on zero-word input; density divides by one.
        let result = classifier().classify("   \n\t  ");
        assert!(!result.related);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "GPT-4 adoption continues across large language model deployments.";
        let first = classifier().classify(text);
        let second = classifier().classify(text);
        assert_eq!(first, second);
        assert!(first.related);
    }
}
