use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use url::Url;

/// A source article backing a news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub title: String,
    pub url: String,
}

impl ArticleLink {
    /// Builds a link, refusing anything that is not an absolute http(s) URL.
    pub fn new(title: impl Into<String>, url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return None;
        }
        Some(Self {
            title: title.into(),
            url: url.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSummary {
    pub title: String,
    pub summary: String,
    pub image_url: String,
    pub links: Vec<ArticleLink>,
}

/// The resolved result of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppData {
    pub summaries: Vec<NewsSummary>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AppData {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub query: String,
    pub date: String,
    pub timestamp: i64,
    pub data: AppData,
}

impl HistoryItem {
    pub fn new(query: impl Into<String>, data: AppData) -> Self {
        Self::at(query, data, Local::now())
    }

    pub fn at<Tz: TimeZone>(query: impl Into<String>, data: AppData, when: DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let timestamp = when.timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-{}", timestamp, &suffix[..8]),
            query: query.into(),
            date: korean_date(&when),
            timestamp,
            data,
        }
    }
}

/// Long-form Korean calendar date, e.g. `2026년 10월 19일`.
pub const KOREAN_DATE_FORMAT: &str = "%Y년 %-m월 %-d일";

pub fn korean_date<Tz: TimeZone>(when: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    when.format(KOREAN_DATE_FORMAT).to_string()
}
