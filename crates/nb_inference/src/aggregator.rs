//! The search pipeline: sanitize, prompt, relay, parse, curate, illustrate.

use std::sync::Arc;
use chrono::{Local, NaiveDate};
use nb_core::{sanitize, AppData, Error, NewsSummary, Relay, RelayRequest, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::curator::{CandidateLink, LinkCurator};
use crate::envelope::{Envelope, EnvelopeStrategy};
use crate::image::{ImageConfig, ImageResolver};
use crate::parser::extract_payload;
use crate::prompt::PromptTemplate;

pub const MAX_SUMMARIES: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    pub prompt: PromptTemplate,
    pub envelope: EnvelopeStrategy,
    pub image: ImageConfig,
    pub curator: Option<LinkCurator>,
}

/// A string as-is, a list of strings joined with `", "`, anything else absent.
fn keyword_phrase(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    title: String,
    summary: String,
    #[serde(default)]
    image_keywords: Value,
    #[serde(default)]
    related_articles: Value,
}

pub struct SummaryAggregator {
    relay: Arc<dyn Relay>,
    prompt: PromptTemplate,
    envelope: EnvelopeStrategy,
    curator: LinkCurator,
    images: ImageResolver,
}

impl std::fmt::Debug for SummaryAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryAggregator")
            .field("relay", &self.relay.name())
            .field("envelope", &self.envelope)
            .finish()
    }
}

impl SummaryAggregator {
    pub fn new(relay: Arc<dyn Relay>, config: AggregatorConfig) -> Self {
        Self {
            relay,
            prompt: config.prompt,
            envelope: config.envelope,
            curator: config.curator.unwrap_or_default(),
            images: ImageResolver::new(config.image),
        }
    }

    pub async fn fetch_news_summary(&self, query: &str) -> Result<AppData> {
        self.fetch_news_summary_on(Local::now().date_naive(), query).await
    }

    /// Runs one search as of `date`. Either a complete [`AppData`] comes back
    /// or an error does; nothing is handed out half built.
    pub async fn fetch_news_summary_on(&self, date: NaiveDate, query: &str) -> Result<AppData> {
        let clean = sanitize(query);
        info!("🔎 Searching news for \"{}\" via {}", clean, self.relay.name());

        let request = RelayRequest::grounded_prompt(self.prompt.render(date, &clean));
        let body = self.relay.generate(&request).await?;

        let payload = match self.envelope.open(&body) {
            Some(Envelope::Payload(value)) => value,
            Some(Envelope::Text(text)) => extract_payload(&text).ok_or_else(|| {
                warn!("No JSON payload in model text ({} chars)", text.chars().count());
                Error::MalformedResponse("no JSON payload in model response".to_string())
            })?,
            None => {
                return Err(Error::MalformedResponse(format!(
                    "relay body matches no {:?} envelope",
                    self.envelope
                )))
            }
        };

        let data = self.build(payload)?;
        info!("✨ Built {} summaries for \"{}\"", data.summaries.len(), clean);
        Ok(data)
    }

    fn build(&self, mut payload: Value) -> Result<AppData> {
        let items = match payload.get_mut("summaries").map(Value::take) {
            Some(Value::Array(items)) if !items.is_empty() => items,
            Some(Value::Array(_)) | Some(Value::Null) | None => return Err(Error::NoResults),
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "summaries is not an array: {}",
                    other
                )))
            }
        };

        let recommendations = match payload.get_mut("recommendations").map(Value::take) {
            Some(Value::Array(topics)) => topics
                .into_iter()
                .filter_map(|t| t.as_str().map(|s| s.trim().to_string()))
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        let summaries = items
            .into_iter()
            .take(MAX_SUMMARIES)
            .enumerate()
            .map(|(i, item)| self.build_item(i, item))
            .collect::<Result<Vec<_>>>()?;

        Ok(AppData {
            summaries,
            recommendations,
        })
    }

    fn build_item(&self, index: usize, item: Value) -> Result<NewsSummary> {
        let raw: RawItem = serde_json::from_value(item)
            .map_err(|e| Error::MalformedResponse(format!("item {} has an unexpected shape: {}", index, e)))?;

        let candidates = CandidateLink::from_value(&raw.related_articles);
        let links = self.curator.curate(&candidates);
        debug!("Item {}: kept {}/{} links", index, links.len(), candidates.len());

        let keywords = keyword_phrase(&raw.image_keywords);
        let image_url = self
            .images
            .resolve(&raw.title, &raw.summary, keywords.as_deref());

        Ok(NewsSummary {
            title: raw.title,
            summary: raw.summary,
            image_url,
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaticRelay;
    use serde_json::json;

    fn aggregator(relay: StaticRelay) -> SummaryAggregator {
        SummaryAggregator::new(Arc::new(relay), AggregatorConfig::default())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_prompt_carries_sanitized_query() {
        let relay = Arc::new(StaticRelay::with_text("{\"summaries\": []}"));
        let aggregator = SummaryAggregator::new(relay.clone(), AggregatorConfig::default());
        let _ = aggregator.fetch_news_summary_on(date(), "`{경제}`\u{0007}").await;

        let requests = relay.requests().await;
        assert_eq!(requests.len(), 1);
        let prompt = &requests[0].messages[0].parts[0].text;
        assert!(prompt.contains("Query: \"'(경제)'\""));
        assert!(prompt.contains("2026년 10월 19일"));
    }

    #[tokio::test]
    async fn test_empty_summaries_is_no_results() {
        let err = aggregator(StaticRelay::with_text("{\"summaries\": []}"))
            .fetch_news_summary_on(date(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoResults));

        let err = aggregator(StaticRelay::with_text("{\"news\": [{\"title\": \"x\"}]}"))
            .fetch_news_summary_on(date(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoResults));
    }

    #[tokio::test]
    async fn test_prose_is_malformed() {
        let err = aggregator(StaticRelay::with_text("검색 결과가 없습니다."))
            .fetch_news_summary_on(date(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unknown_envelope_is_malformed() {
        let err = aggregator(StaticRelay::new(json!({ "promptFeedback": {} })))
            .fetch_news_summary_on(date(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_item_without_summary_is_malformed() {
        let err = aggregator(StaticRelay::with_text("{\"summaries\": [{\"title\": \"only\"}]}"))
            .fetch_news_summary_on(date(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_summaries_are_capped_and_links_curated() {
        let items: Vec<Value> = (0..7)
            .map(|i| {
                json!({
                    "title": format!("title {}", i),
                    "summary": "summary",
                    "imageKeywords": "city skyline, night",
                    "relatedArticles": [
                        { "headline": "yt", "url": "https://youtube.com/watch?v=1" },
                        { "headline": "연합", "url": "https://www.yna.co.kr/view/1" }
                    ]
                })
            })
            .collect();
        let relay = StaticRelay::new(json!({ "summaries": items, "recommendations": ["금리", "", 3] }));
        let data = aggregator(relay).fetch_news_summary_on(date(), "q").await.unwrap();

        assert_eq!(data.summaries.len(), MAX_SUMMARIES);
        assert_eq!(data.recommendations, vec!["금리".to_string()]);
        for summary in &data.summaries {
            assert_eq!(summary.links.len(), 1);
            assert_eq!(summary.links[0].title, "연합");
            assert!(summary.image_url.contains("city%20skyline"));
        }
    }

    #[tokio::test]
    async fn test_keyword_lists_are_joined_and_odd_shapes_fall_back() {
        let relay = StaticRelay::with_text(
            &json!({
                "summaries": [
                    { "title": "a", "summary": "s", "imageKeywords": ["red arrow", "trader", "monitor"] },
                    { "title": "b", "summary": "s" },
                    { "title": "c", "summary": "s", "imageKeywords": { "not": "a phrase" } },
                ]
            })
            .to_string(),
        );
        let data = aggregator(relay).fetch_news_summary("증시").await.unwrap();
        assert_eq!(data.summaries.len(), 3);

        let images = ImageResolver::default();
        assert_eq!(
            data.summaries[0].image_url,
            images.resolve("a", "s", Some("red arrow, trader, monitor"))
        );
        assert_eq!(data.summaries[1].image_url, images.resolve("b", "s", None));
        assert_eq!(data.summaries[2].image_url, images.resolve("c", "s", None));
    }

    #[test]
    fn test_keyword_phrase_shapes() {
        assert_eq!(keyword_phrase(&json!("city skyline")).as_deref(), Some("city skyline"));
        assert_eq!(keyword_phrase(&json!(["a", 1, "b"])).as_deref(), Some("a, b"));
        assert_eq!(keyword_phrase(&Value::Null), None);
        assert_eq!(keyword_phrase(&json!(42)), None);
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let err = aggregator(StaticRelay::failing(500, "boom"))
            .fetch_news_summary_on(date(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.user_message(), nb_core::error::TRANSPORT_MESSAGE);
    }
}
