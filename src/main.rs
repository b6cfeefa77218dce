use poi_nav::{MemoryDom, NavConfig, NavError, PoiSummary, outline_of};
use serde::Serialize;
use std::env;
use std::fs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutlineEntry<'a> {
    id: &'a str,
    kind: poi_nav::PoiKind,
    title: &'a str,
    parent_id: Option<&'a str>,
    depth: u8,
}

impl<'a> From<&'a PoiSummary> for OutlineEntry<'a> {
    fn from(summary: &'a PoiSummary) -> Self {
        Self {
            id: summary.id.as_str(),
            kind: summary.kind,
            title: &summary.title,
            parent_id: summary.parent_id.as_ref().map(|p| p.as_str()),
            depth: summary.depth,
        }
    }
}

/// Prints the outline of a saved XHTML chat snapshot as JSON.
fn main() -> Result<(), NavError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Prints the outline of a saved chat page.");
        eprintln!();
        eprintln!("Usage: {} <path/to/snapshot.xhtml> [path/to/config.json]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(2) {
        Some(path) => NavConfig::from_json(&fs::read_to_string(path)?)?,
        None => NavConfig::default(),
    };

    log::info!("Loading snapshot from {}", args[1]);
    let source = fs::read_to_string(&args[1])?;
    let document = MemoryDom::parse(&source)?.with_url(format!("file://{}", args[1]));

    let pois = outline_of(&document, &config)?;
    if pois.is_empty() {
        log::warn!("No messages found in {}", args[1]);
    }

    let summaries: Vec<PoiSummary> = pois.iter().map(|p| p.summary()).collect();
    let entries: Vec<OutlineEntry<'_>> = summaries.iter().map(OutlineEntry::from).collect();
    let json = serde_json::to_string_pretty(&entries).map_err(|e| NavError::Config(e.into()))?;
    println!("{}", json);
    Ok(())
}
