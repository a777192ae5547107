use anyhow::Context;
use axum::async_trait;
use serde::{Deserialize, Serialize};

/// Score above which a comment counts as positive, below its negation negative.
pub const POSITIVE_THRESHOLD: f32 = 0.25;
/// A result is high-risk when the score is below this and the magnitude above
/// [`HIGH_RISK_MAGNITUDE`].
pub const HIGH_RISK_SCORE: f32 = -0.5;
pub const HIGH_RISK_MAGNITUDE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sentiment_label", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_score(score: f32) -> Self {
        if score > POSITIVE_THRESHOLD {
            Self::Positive
        } else if score < -POSITIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

pub fn is_high_risk(score: f32, magnitude: f32) -> bool {
    score < HIGH_RISK_SCORE && magnitude > HIGH_RISK_MAGNITUDE
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentScore {
    pub score: f32,
    pub magnitude: f32,
    pub language: String,
}

impl SentimentScore {
    /// Stored when analysis is unavailable so a check-in never fails on it.
    pub fn fallback() -> Self {
        Self {
            score: 0.0,
            magnitude: 0.0,
            language: "unknown".to_string(),
        }
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.score)
    }
}

#[async_trait]
pub trait SentimentClient: Send + Sync {
    async fn analyze(&self, text: &str) -> anyhow::Result<SentimentScore>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    doc_type: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    document_sentiment: DocumentSentiment,
    language: Option<String>,
}

#[derive(Deserialize)]
struct DocumentSentiment {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    magnitude: f32,
}

/// Client for the Google Cloud Natural Language `analyzeSentiment` endpoint.
#[derive(Clone)]
pub struct GoogleSentiment {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GoogleSentiment {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SentimentClient for GoogleSentiment {
    async fn analyze(&self, text: &str) -> anyhow::Result<SentimentScore> {
        let url = if self.api_key.is_empty() {
            self.api_url.clone()
        } else {
            format!("{}?key={}", self.api_url, self.api_key)
        };
        let body = AnalyzeRequest {
            document: Document {
                doc_type: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("sentiment request")?
            .error_for_status()
            .context("sentiment status")?
            .json::<AnalyzeResponse>()
            .await
            .context("sentiment response body")?;
        Ok(SentimentScore {
            score: resp.document_sentiment.score,
            magnitude: resp.document_sentiment.magnitude,
            language: resp.language.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// In-memory stand-in used by tests.
#[derive(Clone)]
pub struct FakeSentiment {
    pub score: f32,
    pub magnitude: f32,
}

#[async_trait]
impl SentimentClient for FakeSentiment {
    async fn analyze(&self, _text: &str) -> anyhow::Result<SentimentScore> {
        Ok(SentimentScore {
            score: self.score,
            magnitude: self.magnitude,
            language: "en".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_from_score() {
        assert_eq!(SentimentLabel::from_score(0.8), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.8), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(SentimentLabel::from_score(0.25), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.25), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.26), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.26), SentimentLabel::Negative);
    }

    #[test]
    fn high_risk_requires_both() {
        assert!(is_high_risk(-0.6, 2.5));
        assert!(!is_high_risk(-0.6, 1.0));
        assert!(!is_high_risk(-0.4, 2.5));
        assert!(!is_high_risk(-0.5, 2.0));
    }

    #[test]
    fn fallback_is_neutral() {
        let fallback = SentimentScore::fallback();
        assert_eq!(fallback.label(), SentimentLabel::Neutral);
        assert_eq!(fallback.language, "unknown");
    }

    #[test]
    fn request_serializes_for_the_api() {
        let body = AnalyzeRequest {
            document: Document {
                doc_type: "PLAIN_TEXT",
                content: "feeling great",
            },
            encoding_type: "UTF8",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["document"]["type"], "PLAIN_TEXT");
        assert_eq!(json["encodingType"], "UTF8");
    }

    #[tokio::test]
    async fn fake_client_reports_configured_score() {
        let client: std::sync::Arc<dyn SentimentClient> = std::sync::Arc::new(FakeSentiment {
            score: -0.7,
            magnitude: 2.4,
        });
        let result = client.analyze("exhausted and overwhelmed").await.unwrap();
        assert_eq!(result.label(), SentimentLabel::Negative);
        assert!(is_high_risk(result.score, result.magnitude));
    }
}
