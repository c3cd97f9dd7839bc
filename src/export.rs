use anyhow::Result;

use crate::models::EnrichedRecord;

pub const EXPORT_FILENAME: &str = "fencers_export.csv";

const CSV_HEADER: [&str; 3] = ["Name", "Club", "FencingTracker Search URL"];

/// Serializes the aggregated rows as a CSV document: header row first,
/// then one row per record in aggregation order. Fields are quoted as
/// needed ("Last, First" names always are). No rows yields a
/// header-only document rather than an error.
pub fn write_csv(rows: &[EnrichedRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record([row.name.as_str(), row.club.as_str(), row.url.as_str()])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {e}"))?;
    String::from_utf8(bytes).map_err(|e| anyhow::anyhow!("CSV output was not valid UTF-8: {e}"))
}
