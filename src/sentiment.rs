//! One-shot sentiment analysis over a fixed list of strings.
//!
//! Unrelated to the intake conversation; it only shares the backend layer.

use serde::Deserialize;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// The demo inputs.
pub const SAMPLE_TEXTS: [&str; 4] = [
    "I love this product!",
    "To be Born again, Baby, To be Born Again",
    "Like Jennie,I think i really like",
    "Under the Paris Twilight,Kiss me",
];

const SYSTEM_PROMPT: &str = "You are a sentiment classifier. \
Reply with a single JSON object and nothing else: \
{\"label\": \"POSITIVE\" or \"NEGATIVE\", \"score\": confidence between 0 and 1}.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "POSITIVE"),
            Self::Negative => write!(f, "NEGATIVE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

/// Pull the first `{...}` object out of a reply that may carry prose or a
/// markdown fence around it.
fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text.trim(),
    }
}

/// Parse a backend reply into a sentiment.
pub fn parse_sentiment(reply: &str, provider: &str) -> Result<Sentiment, LlmError> {
    let sentiment: Sentiment = serde_json::from_str(extract_json_object(reply))?;
    if !(0.0..=1.0).contains(&sentiment.score) {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: format!("score {} outside 0..1", sentiment.score),
        });
    }
    Ok(sentiment)
}

/// Classify one text.
pub async fn analyze(llm: &dyn LlmProvider, text: &str) -> Result<Sentiment, LlmError> {
    let request = CompletionRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(text),
    ])
    .with_temperature(0.0)
    .with_max_tokens(64);
    let response = llm.complete(request).await?;
    parse_sentiment(&response.content, llm.model_name())
}

/// Human-readable block for one result, as the demo prints it.
pub fn render(text: &str, sentiment: &Sentiment) -> String {
    format!(
        "\nText: {text}\nSentiment: {}\nConfidence: {:.4}",
        sentiment.label, sentiment.score
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let s = parse_sentiment(r#"{"label": "POSITIVE", "score": 0.9998}"#, "t").unwrap();
        assert_eq!(s.label, SentimentLabel::Positive);
        assert!((s.score - 0.9998).abs() < 1e-9);
    }

    #[test]
    fn parses_json_inside_fence() {
        let reply = "```json\n{\"label\": \"NEGATIVE\", \"score\": 0.7}\n```";
        let s = parse_sentiment(reply, "t").unwrap();
        assert_eq!(s.label, SentimentLabel::Negative);
    }

    #[test]
    fn rejects_garbage_and_bad_scores() {
        assert!(parse_sentiment("I think it's positive", "t").is_err());
        assert!(parse_sentiment(r#"{"label": "NEUTRAL", "score": 0.5}"#, "t").is_err());
        assert!(parse_sentiment(r#"{"label": "POSITIVE", "score": 3.0}"#, "t").is_err());
    }

    #[test]
    fn render_uses_four_decimals() {
        let s = Sentiment {
            label: SentimentLabel::Positive,
            score: 0.99987654,
        };
        let out = render("I love this product!", &s);
        assert!(out.contains("Text: I love this product!"));
        assert!(out.contains("Sentiment: POSITIVE"));
        assert!(out.contains("Confidence: 0.9999"));
    }
}
