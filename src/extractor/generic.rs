use scraper::{Html, Selector};

// Containers that usually wrap the article body, tried in order.
const CONTAINERS: [&str; 6] = [
    "article",
    "main",
    "[role=main]",
    "#content",
    "[itemprop=articleBody]",
    ".post-content",
];

// A container shorter than this is probably a teaser or nav block.
pub const MIN_CONTAINER_CHARS: usize = 200;

/// Reader-style plaintext extraction for arbitrary article pages.
pub fn extract_article_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    for sel in CONTAINERS.iter() {
        if let Some(text) = text_of_first(&doc, sel) {
            if text.chars().count() >= MIN_CONTAINER_CHARS { return Some(text); }
        }
    }

    // fallback: collect all paragraphs
    let p_sel = Selector::parse("p").ok()?;
    let paragraphs: Vec<String> = doc
        .select(&p_sel)
        .map(|p| normalize(&p.text().collect::<String>()))
        .filter(|s| !s.is_empty())
        .collect();
    let joined = paragraphs.join("\n");
    if joined.trim().is_empty() { None } else { Some(joined) }
}

fn text_of_first(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).next()?;
    let s = normalize(&node.text().collect::<String>());
    if s.is_empty() { None } else { Some(s) }
}

// trim lines, drop blank ones
fn normalize(s: &str) -> String {
    let mut out = String::new();
    for line in s.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() { continue; }
        if !out.is_empty() { out.push('\n'); }
        out.push_str(trimmed);
    }
    out
}
