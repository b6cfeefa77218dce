use crate::code_label::code_label;
use crate::poi::{Anchor, Poi, PoiKind};
use crate::text::short_text;
use poi_dom::{DomError, DomNode, SelectorList, parse_selector, sort_in_document_order};
use poi_extract::{Message, Role};
use poi_types::PoiId;

/// Character limits for generated titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleLimits {
    /// Message and heading titles.
    pub title: usize,
    /// Code previews and table header cells.
    pub preview: usize,
    /// Header-derived code labels.
    pub code_header: usize,
}

impl Default for TitleLimits {
    fn default() -> Self {
        Self {
            title: 100,
            preview: 80,
            code_header: 40,
        }
    }
}

/// Builds the outline from extracted messages.
///
/// A pure function of the DOM state: building twice from an unchanged page yields
/// the same ids, titles and order.
#[derive(Debug, Clone)]
pub struct OutlineBuilder {
    headings: SelectorList,
    code_blocks: SelectorList,
    code_element: SelectorList,
    code_header: SelectorList,
    tables: SelectorList,
    header_row: SelectorList,
    header_cell: SelectorList,
    limits: TitleLimits,
}

impl OutlineBuilder {
    pub fn new(limits: TitleLimits) -> Result<Self, DomError> {
        Ok(Self {
            headings: parse_selector("h1, h2, h3")?,
            code_blocks: parse_selector("pre")?,
            code_element: parse_selector("code")?,
            code_header: parse_selector("div > div:first-child")?,
            tables: parse_selector("table")?,
            header_row: parse_selector("thead tr, tr")?,
            header_cell: parse_selector("th, td")?,
            limits,
        })
    }

    pub fn limits(&self) -> TitleLimits {
        self.limits
    }

    pub fn build<N: DomNode>(&self, messages: &[Message<N>]) -> Vec<Poi<N>> {
        let mut result = Vec::new();

        for message in messages {
            let is_user = message.role == Role::User;
            let base_id = PoiId::for_message(message.index, is_user);

            let title = short_text(&message.element.text_content(), self.limits.title);
            let title = if !title.is_empty() {
                title
            } else if is_user {
                "User message".to_string()
            } else {
                "Assistant message".to_string()
            };

            result.push(Poi {
                id: base_id.clone(),
                kind: if is_user { PoiKind::Prompt } else { PoiKind::Response },
                title,
                anchor: Anchor::new(message.element.clone()),
                parent_id: None,
                depth: 0,
                marked: false,
                color_tag: None,
            });

            if !is_user {
                self.push_headings(&message.element, &base_id, &mut result);
                self.push_code_blocks(&message.element, &base_id, &mut result);
                self.push_tables(&message.element, &base_id, &mut result);
            }
        }

        sort_in_document_order(&mut result, |poi| poi.anchor.handle());
        log::debug!(
            "outline: {} message(s) -> {} poi(s)",
            messages.len(),
            result.len()
        );
        result
    }

    fn push_headings<N: DomNode>(&self, root: &N, base_id: &PoiId, out: &mut Vec<Poi<N>>) {
        for (i, heading) in root.select_all(&self.headings).into_iter().enumerate() {
            let level = heading_level(&heading.tag_name());
            let title = short_text(&heading.text_content(), self.limits.title);
            out.push(Poi {
                id: base_id.child(&format!("h{}", level), i + 1),
                kind: PoiKind::Heading,
                title: if title.is_empty() { "Heading".to_string() } else { title },
                anchor: Anchor::new(heading),
                parent_id: Some(base_id.clone()),
                depth: level,
                marked: false,
                color_tag: None,
            });
        }
    }

    fn push_code_blocks<N: DomNode>(&self, root: &N, base_id: &PoiId, out: &mut Vec<Poi<N>>) {
        for (i, pre) in root.select_all(&self.code_blocks).into_iter().enumerate() {
            let code = pre.select_first(&self.code_element).unwrap_or_else(|| pre.clone());
            let label = code_label(&code, &self.code_header, self.limits.code_header);
            let preview = short_text(&code.text_content(), self.limits.preview);
            let preview = if preview.is_empty() { "Code block".to_string() } else { preview };
            out.push(Poi {
                id: base_id.child("code", i + 1),
                kind: PoiKind::Code,
                title: format!("{}: {}", label, preview),
                anchor: Anchor::new(pre),
                parent_id: Some(base_id.clone()),
                depth: 1,
                marked: false,
                color_tag: None,
            });
        }
    }

    fn push_tables<N: DomNode>(&self, root: &N, base_id: &PoiId, out: &mut Vec<Poi<N>>) {
        for (i, table) in root.select_all(&self.tables).into_iter().enumerate() {
            let header = table
                .select_first(&self.header_row)
                .and_then(|row| row.select_first(&self.header_cell))
                .map(|cell| short_text(&cell.text_content(), self.limits.preview))
                .unwrap_or_default();
            let title = if header.is_empty() {
                "Table".to_string()
            } else {
                format!("Table: {}", header)
            };
            out.push(Poi {
                id: base_id.child("table", i + 1),
                kind: PoiKind::Table,
                title,
                anchor: Anchor::new(table),
                parent_id: Some(base_id.clone()),
                depth: 1,
                marked: false,
                color_tag: None,
            });
        }
    }
}

fn heading_level(tag: &str) -> u8 {
    match tag {
        "h1" => 1,
        "h2" => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_dom::MemoryDom;
    use poi_extract::Extractor;

    fn build(xml: &str) -> Vec<Poi<poi_dom::MemNode>> {
        let dom = MemoryDom::parse(xml).unwrap();
        let messages = Extractor::standard().unwrap().extract_messages(&dom);
        OutlineBuilder::new(TitleLimits::default()).unwrap().build(&messages)
    }

    fn ids(pois: &[Poi<poi_dom::MemNode>]) -> Vec<&str> {
        pois.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn user_messages_have_no_children() {
        let pois = build(
            r#"<html><body><article data-message-author-role="user"><h1>Not a heading</h1><pre>x</pre></article></body></html>"#,
        );
        assert_eq!(ids(&pois), vec!["msg_1_prompt"]);
        assert_eq!(pois[0].kind, PoiKind::Prompt);
        assert_eq!(pois[0].title, "Not a headingx");
    }

    #[test]
    fn headings_share_one_counter_and_interleave_with_code() {
        let pois = build(
            r#"<html><body><article data-message-author-role="assistant">
<h2>Setup</h2><pre><code class="language-sh">make</code></pre><h1>Run</h1><h3>Details</h3>
</article></body></html>"#,
        );
        assert_eq!(
            ids(&pois),
            vec![
                "msg_1_response",
                "msg_1_response_h2_1",
                "msg_1_response_code_1",
                "msg_1_response_h1_2",
                "msg_1_response_h3_3",
            ]
        );
        let depths: Vec<u8> = pois.iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![0, 2, 1, 1, 3]);
        assert!(pois[1..].iter().all(|p| p.parent_id.as_ref() == Some(&pois[0].id)));
        assert_eq!(pois[2].title, "sh: make");
    }

    #[test]
    fn table_titles() {
        let pois = build(
            r#"<html><body><article data-message-author-role="assistant">
<table><thead><tr><th>Metric</th><th>Value</th></tr></thead><tbody><tr><td>a</td></tr></tbody></table>
<table><tbody><tr><td>  </td></tr></tbody></table>
<table/>
</article></body></html>"#,
        );
        let titles: Vec<&str> = pois.iter().skip(1).map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Table: Metric", "Table", "Table"]);
        assert_eq!(pois[3].id.as_str(), "msg_1_response_table_3");
    }

    #[test]
    fn empty_text_falls_back_to_placeholders() {
        let pois = build(
            r#"<html><body>
<article data-message-author-role="user"> </article>
<article data-message-author-role="assistant"><h2/><pre><code class="language-js"/></pre></article>
</body></html>"#,
        );
        let titles: Vec<&str> = pois.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["User message", "Assistant message", "Heading", "js: Code block"]
        );
    }

    #[test]
    fn unknown_roles_are_responses() {
        let pois = build(
            r#"<html><body><article data-message-author-role="system">Rules<h1>Scope</h1></article></body></html>"#,
        );
        assert_eq!(ids(&pois), vec!["msg_1_response", "msg_1_response_h1_1"]);
    }
}
