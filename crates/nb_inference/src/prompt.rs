use chrono::NaiveDate;
use nb_core::KOREAN_DATE_FORMAT;
use serde::{Deserialize, Serialize};

/// News-curator instructions. `{date}` and `{query}` are filled in per search.
pub const NEWS_CURATOR_TEMPLATE: &str = r#"
You are a professional news curator.
Date: {date}
Query: "{query}"

**TASK**:
1. Search via 'googleSearch' for the top 3-5 distinct, authoritative news.
2. Output JSON.

**FIELDS**:
- **summary**: 3-5 sentences. Detailed context. Korean.
- **imageKeywords**:
  - 3-5 concrete English nouns/adjectives describing the scene.
  - NO text, NO graphs, NO abstract concepts.
  - Example: "Blue house, president, press conference, suits" (O)
  - Example: "Economic downfall concept" (X) -> "Red stock arrow, worried trader, monitor" (O)
- **relatedArticles**:
  - STRICTLY REAL URLs from the search tool.
  - At least 1 valid link per item.

**JSON Output:**
{
  "summaries": [
    {
      "title": "Headline",
      "summary": "Content...",
      "imageKeywords": "visually descriptive english keywords",
      "relatedArticles": [ { "headline": "Title", "url": "http..." } ]
    }
  ],
  "recommendations": ["Topic1", "Topic2"]
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate(String);

impl Default for PromptTemplate {
    fn default() -> Self {
        Self(NEWS_CURATOR_TEMPLATE.to_string())
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Fills the placeholders. The query must already be sanitized: it is
    /// inserted last and carries no braces, so it cannot open a placeholder.
    pub fn render(&self, date: NaiveDate, query: &str) -> String {
        self.0
            .replace("{date}", &date.format(KOREAN_DATE_FORMAT).to_string())
            .replace("{query}", query)
    }
}
