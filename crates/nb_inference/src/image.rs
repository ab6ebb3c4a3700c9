//! Deterministic illustration URLs for news items.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

pub const FALLBACK_KEYWORDS: &str = "breaking news, journalism, detailed, realistic";
pub const STYLE_QUALIFIERS: &str = "news photography, realistic, 4k, cinematic lighting";

/// Characters `encodeURIComponent` leaves untouched.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const SEED_SUMMARY_UNITS: usize = 10;
const MIN_KEYWORD_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
    pub model: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://image.pollinations.ai/prompt".to_string(),
            width: 768,
            height: 512,
            model: "flux".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    config: ImageConfig,
}

impl ImageResolver {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Builds the image URL for an item. Equal titles and summary openings
    /// always produce the same seed, so a repeated item renders the same picture.
    pub fn resolve(&self, title: &str, summary: &str, keywords: Option<&str>) -> String {
        let seed = seed_for(title, summary);
        let keywords = keywords
            .map(str::trim)
            .filter(|k| k.chars().count() >= MIN_KEYWORD_CHARS)
            .unwrap_or(FALLBACK_KEYWORDS);
        let prompt = format!("{}, {}", keywords, STYLE_QUALIFIERS);

        format!(
            "{}/{}?width={}&height={}&model={}&nologo=true&seed={}",
            self.config.base_url.trim_end_matches('/'),
            utf8_percent_encode(&prompt, COMPONENT),
            self.config.width,
            self.config.height,
            self.config.model,
            seed
        )
    }
}

/// 31-multiplier rolling hash over UTF-16 code units, wrapped to `i32`.
pub fn hash_code(units: impl IntoIterator<Item = u16>) -> u32 {
    units
        .into_iter()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
        .unsigned_abs()
}

/// Seed from the title followed by the first ten code units of the summary.
pub fn seed_for(title: &str, summary: &str) -> u32 {
    hash_code(
        title
            .encode_utf16()
            .chain(summary.encode_utf16().take(SEED_SUMMARY_UNITS)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches_java_string_hash() {
        assert_eq!(hash_code("".encode_utf16()), 0);
        assert_eq!(hash_code("a".encode_utf16()), 97);
        assert_eq!(hash_code("hello".encode_utf16()), 99_162_322);
        // "polygenelubricants".hashCode() == Integer.MIN_VALUE
        assert_eq!(hash_code("polygenelubricants".encode_utf16()), 2_147_483_648);
    }

    #[test]
    fn test_seed_uses_summary_prefix_only() {
        let a = seed_for("금리 인상", "한국은행이 기준금리를 인상했다. 시장은 이미 예상하고 있었다.");
        let b = seed_for("금리 인상", "한국은행이 기준금리를 인상했다. 다른 내용이 이어진다.");
        assert_eq!(a, b);
        assert_ne!(a, seed_for("금리 동결", "한국은행이 기준금리를 인상했다."));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let resolver = ImageResolver::default();
        let first = resolver.resolve("Title", "Summary text here", Some("red arrow, trader"));
        let second = resolver.resolve("Title", "Summary text here", Some("red arrow, trader"));
        assert_eq!(first, second);
        assert!(first.ends_with(&format!("seed={}", seed_for("Title", "Summary text here"))));
    }

    #[test]
    fn test_resolve_url_shape() {
        let url = ImageResolver::default().resolve("t", "s", Some("Blue house, president"));
        assert!(url.starts_with(
            "https://image.pollinations.ai/prompt/Blue%20house%2C%20president%2C%20news%20photography"
        ));
        assert!(url.contains("?width=768&height=512&model=flux&nologo=true&seed="));
    }

    #[test]
    fn test_short_or_missing_keywords_use_fallback() {
        let resolver = ImageResolver::default();
        let encoded = utf8_percent_encode(FALLBACK_KEYWORDS, COMPONENT).to_string();
        for keywords in [None, Some(""), Some("ab"), Some("  x ")] {
            let url = resolver.resolve("t", "s", keywords);
            assert!(url.contains(&encoded), "{url}");
        }
    }

    #[test]
    fn test_component_encoding_keeps_unreserved_marks() {
        let encoded = utf8_percent_encode("it's (ok)! a*b~c 경제", COMPONENT).to_string();
        assert_eq!(encoded, "it's%20(ok)!%20a*b~c%20%EA%B2%BD%EC%A0%9C");
    }

    #[test]
    fn test_custom_config() {
        let resolver = ImageResolver::new(ImageConfig {
            base_url: "https://img.example/p/".to_string(),
            width: 100,
            height: 50,
            model: "turbo".to_string(),
        });
        let url = resolver.resolve("t", "s", Some("cat on a roof"));
        assert!(url.starts_with("https://img.example/p/cat%20on%20a%20roof"));
        assert!(url.contains("width=100&height=50&model=turbo"));
    }
}
