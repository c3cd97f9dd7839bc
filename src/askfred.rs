use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::models::{EnrichedRecord, EventGroup};
use crate::tracker;

const FETCH_TIMEOUT_SECS: u64 = 10;
const UNNAMED_EVENT: &str = "Unnamed Event";

static EVENT_SECTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.card-body.p-0").expect("static selector is valid"));
static PREREG_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.preregistration-list").expect("static selector is valid"));
static TABLE_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("static selector is valid"));
static TABLE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("static selector is valid"));

/// Source of per-event rosters for a tournament URL. The production
/// implementation fetches and scrapes AskFred; tests substitute a fake.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch_events(&self, url: &str) -> Result<Vec<EventGroup>>;
}

#[derive(Debug, Clone)]
pub struct AskFredClient {
    client: Client,
}

impl AskFredClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RosterSource for AskFredClient {
    async fn fetch_events(&self, url: &str) -> Result<Vec<EventGroup>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch tournament page {url}"))?
            .error_for_status()
            .context("Tournament page returned an error status")?;
        let body = response
            .text()
            .await
            .context("Failed to read tournament page body")?;
        Ok(extract_events(&body))
    }
}

/// Pulls (event name, fencer rows) out of an AskFred tournament page.
///
/// Each `div.card-body.p-0` section is one event; its name comes from
/// the nearest preceding `card-header` sibling. Rows live in the
/// preregistration table with name and club in the second and third
/// cells. Events without any extracted fencers are omitted, and a
/// section missing its table loses only that event's records.
pub fn extract_events(html: &str) -> Vec<EventGroup> {
    let document = Html::parse_document(html);
    let mut events = Vec::new();

    for section in document.select(&EVENT_SECTION) {
        let name = event_header(section).unwrap_or_else(|| UNNAMED_EVENT.to_string());
        let fencers = extract_fencers(section);
        if !fencers.is_empty() {
            events.push(EventGroup { name, fencers });
        }
    }

    events
}

fn event_header(section: ElementRef<'_>) -> Option<String> {
    section
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().classes().any(|c| c == "card-header"))
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn extract_fencers(section: ElementRef<'_>) -> Vec<EnrichedRecord> {
    let Some(table) = section.select(&PREREG_TABLE).next() else {
        return Vec::new();
    };

    let mut fencers = Vec::new();
    for row in table.select(&TABLE_ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&TABLE_CELL).collect();
        if cells.len() < 3 {
            continue;
        }
        let name = element_text(cells[1]);
        if name.is_empty() {
            continue;
        }
        let club = element_text(cells[2]);
        fencers.push(EnrichedRecord {
            url: tracker::search_url(&name),
            name,
            club,
        });
    }
    fencers
}

fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
