use std::fmt::Write;

use nb_core::AppData;
use nb_storage::HistoryStore;

pub fn brief(query: &str, data: &AppData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📰 \"{}\" 브리핑", query);
    for (i, item) in data.summaries.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}. {}", i + 1, item.title);
        let _ = writeln!(out, "   {}", item.summary);
        let _ = writeln!(out, "   🖼️  {}", item.image_url);
        for link in &item.links {
            let _ = writeln!(out, "   🔗 {} <{}>", link.title, link.url);
        }
    }
    if !data.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "💡 추천 검색어");
        for topic in &data.recommendations {
            let _ = writeln!(out, "   nb search \"{}\"", topic);
        }
    }
    out
}

pub fn history(history: &HistoryStore) -> String {
    if history.is_empty() {
        return "검색 기록이 없습니다.\n".to_string();
    }
    let mut out = String::new();
    for group in history.grouped_by_date() {
        let _ = writeln!(out, "📅 {}", group.date);
        for item in group.items {
            let _ = writeln!(
                out,
                "   {}  {} ({}건)",
                item.id,
                item.query,
                item.data.summaries.len()
            );
        }
    }
    out
}
