use crate::model::TextModel;
use crate::retry::RetryPolicy;
use crate::types::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Word budget applied to model input to stay inside context limits.
const MAX_INPUT_WORDS: usize = 1024;

/// Condenses article text to a short synopsis. The primary path delegates
/// to the text-generation collaborator; any failure there falls back to the
/// deterministic extractive algorithm.
pub struct Summarizer {
    model: Arc<dyn TextModel>,
    retry: RetryPolicy,
    keywords: Vec<String>,
    max_len: usize,
    min_len: usize,
}

impl Summarizer {
    pub fn new(model: Arc<dyn TextModel>, retry: RetryPolicy, keywords: Vec<String>) -> Self {
        Self {
            model,
            retry,
            keywords,
            max_len: 150,
            min_len: 50,
        }
    }

    pub fn with_lengths(mut self, max_len: usize, min_len: usize) -> Self {
        self.max_len = max_len;
        self.min_len = min_len;
        self
    }

    /// Produce a summary for `text`. Never fails and never returns an empty
    /// string for non-empty input; output always ends with `.` or `...`.
    pub async fn summarize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        match self.summarize_with_model(text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    "Model summarization failed ({}), using extractive fallback",
                    e
                );
                extractive_summary(text, &self.keywords, self.max_len)
            }
        }
    }

    async fn summarize_with_model(&self, text: &str) -> Result<String> {
        let capped = cap_words(text, MAX_INPUT_WORDS);

        let raw = self
            .retry
            .run("model summarization", || {
                self.model.generate(&capped, self.max_len, self.min_len)
            })
            .await?;

        let mut summary = raw.trim().to_string();
        if !summary.ends_with('.') {
            summary.push('.');
        }
        debug!("Generated summary via {}: {} chars", self.model.model_name(), summary.len());
        Ok(summary)
    }
}

fn cap_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        words[..max_words].join(" ")
    } else {
        text.to_string()
    }
}

/// Deterministic extractive fallback: selects the highest-scoring original
/// sentences until the length budget is spent.
pub fn extractive_summary(text: &str, keywords: &[String], max_len: usize) -> String {
    let sentences: Vec<&str> = text.split(". ").collect();

    if sentences.len() <= 2 {
        return truncate_with_ellipsis(text, max_len);
    }

    let mut scored: Vec<(f64, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let lower = sentence.to_lowercase();
            let mut score: f64 = keywords
                .iter()
                .filter(|keyword| lower.contains(keyword.to_lowercase().as_str()))
                .count() as f64;
            // Leading sentences tend to carry the key information.
            if i < 3 {
                score += 0.5;
            }
            (score, *sentence)
        })
        .collect();

    // Stable sort keeps original order among equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut parts: Vec<&str> = Vec::new();
    let mut current_len = 0usize;
    for (_, sentence) in &scored {
        // Account for the ". " joiner so the budget holds after assembly.
        let addition = sentence.len() + if parts.is_empty() { 0 } else { 2 };
        if current_len + addition > max_len {
            break;
        }
        parts.push(sentence);
        current_len += addition;
    }

    if parts.is_empty() {
        return truncate_with_ellipsis(text, max_len);
    }

    let mut summary = parts.join(". ");
    if !summary.ends_with('.') {
        summary.push('.');
    }
    summary
}

fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_keywords;
    use crate::model::MockTextModel;
    use crate::retry::RetryPolicy;
    use std::time::Duration;

    fn summarizer(model: MockTextModel) -> Summarizer {
        let retry = RetryPolicy::new(2, Duration::from_millis(1), 2.0);
        Summarizer::new(Arc::new(model), retry, default_keywords())
    }

    #[tokio::test]
    async fn model_path_appends_terminal_period() {
        let s = summarizer(MockTextModel::with_reply("A tidy model summary"));
        let summary = s.summarize("Some article text about generative ai.").await;
        assert_eq!(summary, "A tidy model summary.");
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_extractive() {
        let s = summarizer(MockTextModel::failing());
        let text = "Banks adopt generative ai tools. Customers notice faster service. \
                    Analysts expect further llm investment. Regulators are watching closely.";
        let summary = s.summarize(text).await;
        assert!(!summary.is_empty());
        assert!(summary.ends_with('.') || summary.ends_with("..."));
    }

    #[tokio::test]
    async fn empty_input_stays_empty() {
        let s = summarizer(MockTextModel::failing());
        assert_eq!(s.summarize("").await, "");
    }

    #[test]
    fn single_sentence_is_returned_as_is() {
        let text = "One short sentence";
        let summary = extractive_summary(text, &default_keywords(), 150);
        assert_eq!(summary, text);
    }

    #[test]
    fn short_input_is_truncated_with_ellipsis() {
        let text = "x".repeat(200);
        let summary = extractive_summary(&text, &default_keywords(), 150);
        assert_eq!(summary.chars().count(), 153);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn output_never_exceeds_budget_plus_allowance() {
        let text = "Generative ai leads the quarter. The chatgpt rollout expanded. \
                    Teams shipped llm features weekly. Costs stayed flat. \
                    Customers reported better outcomes. More launches are planned.";
        for max_len in [30, 80, 150, 400] {
            let summary = extractive_summary(text, &default_keywords(), max_len);
            assert!(
                summary.chars().count() <= max_len + 3,
                "len {} exceeds budget {}",
                summary.chars().count(),
                max_len
            );
        }
    }

    #[test]
    fn keyword_sentences_are_preferred() {
        let text = "The weather was mild on Tuesday. Nothing else happened downtown. \
                    The firm launched a generative ai assistant built on a large language model. \
                    Lunch was served at noon. The parking lot was repaved.";
        let summary = extractive_summary(text, &default_keywords(), 150);
        assert!(summary.contains("generative ai"));
    }

    #[test]
    fn extractive_summary_is_deterministic() {
        let text = "First fact here. Second fact there. Third fact about llm tools. \
                    Fourth fact elsewhere. Fifth and final fact.";
        let a = extractive_summary(text, &default_keywords(), 100);
        let b = extractive_summary(text, &default_keywords(), 100);
        assert_eq!(a, b);
    }

    #[test]
    fn multibyte_text_truncates_without_panic() {
        let text = "é".repeat(300);
        let summary = extractive_summary(&text, &default_keywords(), 150);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn cap_words_enforces_budget() {
        let text = "word ".repeat(2000);
        let capped = cap_words(&text, MAX_INPUT_WORDS);
        assert_eq!(capped.split_whitespace().count(), MAX_INPUT_WORDS);
    }
}
