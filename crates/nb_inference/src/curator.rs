//! Ranking and filtering of the source links a model attaches to each item.

use nb_core::ArticleLink;
use serde::Deserialize;
use serde_json::Value;

pub const MAX_LINKS: usize = 2;
pub const DEFAULT_LINK_TITLE: &str = "관련 기사 보기";

/// Social, wiki and community sites that are never offered as sources.
pub const BLOCKED_DOMAINS: &[&str] = &[
    "namu.wiki",
    "youtube.com",
    "dcinside.com",
    "fmkorea.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "wikipedia.org",
];

/// Publishers whose links are preferred.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "naver.com", "daum.net", "kakao.com", "yna.co.kr", "chosun.com", "joongang.co.kr", "donga.com",
    "hani.co.kr", "khan.co.kr", "mk.co.kr", "hankyung.com", "mt.co.kr", "fnnews.com", "etnews.com",
    "zdnet.co.kr", "kbs.co.kr", "imbc.com", "sbs.co.kr", "jtbc.co.kr", "ytn.co.kr", "yonhapnewstv.co.kr",
    "news1.kr", "newsis.com", "nocutnews.co.kr", "seoul.co.kr", "segye.com", "kmib.co.kr",
    "cnn.com", "bbc.com", "reuters.com", "bloomberg.com", "apnews.com", "nytimes.com", "wsj.com",
];

/// A link as the model reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CandidateLink {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CandidateLink {
    pub fn new(headline: &str, url: &str) -> Self {
        Self {
            headline: Some(headline.to_string()),
            title: None,
            url: Some(url.to_string()),
        }
    }

    /// Reads candidates from an arbitrary JSON value; anything that is not an
    /// array yields nothing and unreadable entries are skipped.
    pub fn from_value(value: &Value) -> Vec<CandidateLink> {
        value
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn display_title(&self) -> String {
        non_blank(&self.headline)
            .or_else(|| non_blank(&self.title))
            .unwrap_or(DEFAULT_LINK_TITLE)
            .to_string()
    }
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct LinkCurator {
    blocked: Vec<String>,
    trusted: Vec<String>,
}

impl Default for LinkCurator {
    fn default() -> Self {
        Self::with_lists(BLOCKED_DOMAINS, TRUSTED_DOMAINS)
    }
}

impl LinkCurator {
    pub fn with_lists(blocked: &[&str], trusted: &[&str]) -> Self {
        Self {
            blocked: blocked.iter().map(|d| d.to_string()).collect(),
            trusted: trusted.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn is_blocked(&self, url: &str) -> bool {
        self.blocked.iter().any(|d| url.contains(d.as_str()))
    }

    fn is_trusted(&self, url: &str) -> bool {
        self.trusted.iter().any(|d| url.contains(d.as_str()))
    }

    /// Keeps at most two safe links, trusted publishers first. When no trusted
    /// link survives, the first safe one is kept so an item is never left bare.
    pub fn curate(&self, candidates: &[CandidateLink]) -> Vec<ArticleLink> {
        let safe: Vec<(&CandidateLink, &str)> = candidates
            .iter()
            .filter_map(|c| c.url.as_deref().map(|url| (c, url)))
            .filter(|(_, url)| url.starts_with("http"))
            .filter(|(_, url)| !url.ends_with("...") && !url.ends_with('…'))
            .filter(|(_, url)| !self.is_blocked(url))
            .filter(|(_, url)| ArticleLink::new("", url).is_some())
            .collect();

        let mut chosen: Vec<_> = safe.iter().filter(|(_, url)| self.is_trusted(url)).collect();
        if chosen.is_empty() {
            chosen.extend(safe.first());
        }

        chosen
            .into_iter()
            .take(MAX_LINKS)
            .filter_map(|(candidate, url)| ArticleLink::new(candidate.display_title(), url))
            .collect()
    }
}
