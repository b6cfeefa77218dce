use crate::text::short_text;
use poi_dom::{DomNode, SelectorList};
use regex::Regex;
use std::sync::LazyLock;

static LANGUAGE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)language-([\w-]+)").expect("BUG: invalid LANGUAGE_CLASS_RE regex literal")
});

/// The label of a code block: the `language-<tag>` class when present, else the
/// text of a header-like first child (truncated to `header_limit`), else `"Code"`.
pub fn code_label<N: DomNode>(code: &N, header: &SelectorList, header_limit: usize) -> String {
    if let Some(class) = code.attribute("class") {
        if let Some(captures) = LANGUAGE_CLASS_RE.captures(&class) {
            return captures[1].to_string();
        }
    }

    if let Some(header_node) = code.select_first(header) {
        let text = short_text(&header_node.text_content(), header_limit);
        if !text.is_empty() {
            return text;
        }
    }

    "Code".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_dom::{DomDocument, MemoryDom, parse_selector};

    fn label_of(xml: &str) -> String {
        let dom = MemoryDom::parse(xml).unwrap();
        let root = dom.document_element().unwrap();
        let header = parse_selector("div > div:first-child").unwrap();
        code_label(&root, &header, 40)
    }

    #[test]
    fn language_class_wins() {
        assert_eq!(label_of(r#"<code class="hljs language-rust">fn</code>"#), "rust");
        assert_eq!(label_of(r#"<code class="Language-Objective-C">x</code>"#), "Objective-C");
    }

    #[test]
    fn header_child_is_second_choice() {
        assert_eq!(
            label_of("<pre><div><div>bash</div><div>Copy code</div></div><code>ls</code></pre>"),
            "bash"
        );
    }

    #[test]
    fn defaults_to_code() {
        assert_eq!(label_of("<code>plain</code>"), "Code");
        assert_eq!(label_of("<pre><div><div>  </div></div></pre>"), "Code");
    }
}
