use serde::{Deserialize, Serialize};

/// A (name, club) pair recovered from either ingestion path. The club
/// may be empty when the source block was incomplete.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FencerRecord {
    pub name: String,
    pub club: String,
}

/// A fencer record plus its derived fencingtracker search URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub name: String,
    pub club: String,
    pub url: String,
}

/// One AskFred event and the fencers extracted from its table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventGroup {
    pub name: String,
    pub fencers: Vec<EnrichedRecord>,
}

/// What a generate request produced, shaped per source: AskFred pages
/// group fencers by event, pasted text yields a flat list.
#[derive(Debug, Clone)]
pub enum RosterResults {
    Events(Vec<EventGroup>),
    Entrants(Vec<EnrichedRecord>),
}

impl RosterResults {
    /// Flattens to the (name, club, url) sequence the session buffer
    /// and CSV export carry, in emission order.
    pub fn export_rows(&self) -> Vec<EnrichedRecord> {
        match self {
            RosterResults::Events(events) => events
                .iter()
                .flat_map(|e| e.fencers.iter().cloned())
                .collect(),
            RosterResults::Entrants(fencers) => fencers.clone(),
        }
    }
}
