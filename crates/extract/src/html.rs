use scraper::{Html, Node};

/// Elements whose text is invisible or irrelevant to a reader.
const HIDDEN_CONTAINERS: &[&str] = &["script", "style", "head", "title", "meta", "noscript"];

/// Extract the visible text of an HTML page, joined with single spaces.
///
/// Comments and anything inside script/style/head subtrees are dropped;
/// everything else is flattened to linear prose in document order.
pub fn extract_html(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| HIDDEN_CONTAINERS.contains(&el.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}
