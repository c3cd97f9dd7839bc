use crate::models::{EnrichedRecord, FencerRecord};

const SEARCH_BASE: &str = "https://fencingtracker.com/search";

/// Builds the fencingtracker profile-search URL for a fencer name:
/// whitespace-separated fragments joined with `+` into the `s` query
/// parameter. The comma in "Last, First" is carried through verbatim;
/// no further URL escaping is applied, matching what the search
/// endpoint has always been fed.
pub fn search_url(name: &str) -> String {
    let query = name.split_whitespace().collect::<Vec<_>>().join("+");
    format!("{SEARCH_BASE}?s={query}")
}

/// Lifts a parsed record into its enriched form. Both ingestion paths
/// go through here so URL construction cannot drift between them.
pub fn enrich(record: FencerRecord) -> EnrichedRecord {
    let url = search_url(&record.name);
    EnrichedRecord {
        name: record.name,
        club: record.club,
        url,
    }
}

pub fn enrich_all(records: Vec<FencerRecord>) -> Vec<EnrichedRecord> {
    records.into_iter().map(enrich).collect()
}
