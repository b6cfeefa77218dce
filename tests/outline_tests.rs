mod common;

use common::{BASIC_CHAT, chat};
use poi_nav::{ColorTag, MemoryDom, NavConfig, Poi, outline_of};
use poi_dom::{DomNode, MemNode};
use std::cmp::Ordering;

fn outline(xml: &str) -> Vec<Poi<MemNode>> {
    let dom = MemoryDom::parse(xml).unwrap();
    outline_of(&dom, &NavConfig::default()).unwrap()
}

#[test]
fn building_twice_from_a_frozen_page_is_identical() {
    let dom = MemoryDom::parse(BASIC_CHAT).unwrap();
    let config = NavConfig::default();
    let first = outline_of(&dom, &config).unwrap();
    let second = outline_of(&dom, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}

#[test]
fn outline_follows_document_order() {
    let pois = outline(&chat(&[
        ("user", "Compare these"),
        (
            "assistant",
            r#"<h2>Intro</h2><table><tr><th>A</th></tr></table><pre><code>x</code></pre><h3>Deep</h3><div><h1>Top</h1><pre>y</pre></div>"#,
        ),
        ("assistant", "<pre><code class=\"language-rust\">fn main() {}</code></pre>"),
    ]));

    for (i, a) in pois.iter().enumerate() {
        for b in &pois[i + 1..] {
            let order = a.anchor.handle().compare_position(b.anchor.handle());
            assert_ne!(order, Some(Ordering::Greater), "{} must not follow {}", a.id, b.id);
        }
    }

    let ids: Vec<&str> = pois.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "msg_1_prompt",
            "msg_2_response",
            "msg_2_response_h2_1",
            "msg_2_response_table_1",
            "msg_2_response_code_1",
            "msg_2_response_h3_2",
            "msg_2_response_h1_3",
            "msg_2_response_code_2",
            "msg_3_response",
            "msg_3_response_code_1",
        ]
    );
    assert_eq!(pois[9].title, "rust: fn main() {}");
    assert_eq!(pois[3].title, "Table: A");
    assert_eq!(pois[7].title, "Code: y");
}

#[test]
fn long_first_lines_are_truncated_with_one_ellipsis() {
    let line = "x".repeat(150);
    let pois = outline(&chat(&[("user", &format!("{}\nsecond line", line))]));
    let title = &pois[0].title;
    assert_eq!(title.chars().count(), 101);
    assert!(title.starts_with(&"x".repeat(100)));
    assert!(title.ends_with('…'));
}

#[test]
fn exact_length_titles_are_not_truncated() {
    let line = "y".repeat(100);
    let pois = outline(&chat(&[("assistant", &line)]));
    assert_eq!(pois[0].title, line);
}

#[test]
fn custom_title_limits_apply() {
    let dom = MemoryDom::parse(&chat(&[("user", "abcdefghij")])).unwrap();
    let config = NavConfig {
        title_limit: 4,
        ..NavConfig::default()
    };
    let pois = outline_of(&dom, &config).unwrap();
    assert_eq!(pois[0].title, "abcd…");
}

#[test]
fn empty_chat_has_an_empty_outline() {
    assert!(outline(&chat(&[])).is_empty());
}

#[test]
fn auto_pick_prefers_unused_tags() {
    let used = [ColorTag::Sunrise, ColorTag::Sky, ColorTag::Ocean];
    let picked = ColorTag::auto_pick(used);
    assert!(!used.contains(&picked));
    assert_eq!(picked, ColorTag::Sunset);

    let all_once: Vec<ColorTag> = ColorTag::PALETTE.to_vec();
    let mut twice = all_once.clone();
    twice.extend(all_once.iter().filter(|t| **t != ColorTag::Violet));
    assert_eq!(ColorTag::auto_pick(twice), ColorTag::Violet);
}

#[test]
fn summaries_serialize_for_the_presentation_layer() {
    let pois = outline(BASIC_CHAT);
    let summary = pois[4].summary();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["id"], "msg_4_response_h1_1");
    assert_eq!(json["kind"], "heading");
    assert_eq!(json["parentId"], "msg_4_response");
    assert_eq!(json["depth"], 1);
    assert_eq!(json["marked"], false);
    assert!(json["colorTag"].is_null());
}
