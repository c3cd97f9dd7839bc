use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FencerRecord;

/// The USA flag glyph that precedes the club/rating line in text copied
/// from the entrants page. Located by substring search; it is a content
/// marker, not a delimiter.
pub const FLAG_MARKER: &str = "🇺🇸";

/// How many lines past a name candidate are inspected for the marker.
const LOOKAHEAD_LINES: usize = 3;

static RANK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\d+").expect("static rank-marker pattern is valid")
});

/// Strips seed/rank markers like `#1` out of a club line and trims
/// whatever whitespace the removal leaves behind.
pub fn clean_club_line(raw: &str) -> String {
    RANK_MARKER.replace_all(raw, "").trim().to_string()
}

/// Recovers (name, club) records from text pasted off the USA Fencing
/// entrants page.
///
/// The pasted text has no schema: names are comma-containing lines
/// ("Last, First"), each followed within a few lines by a flag glyph
/// and then the club/rating line, with narrative prose interleaved. A
/// comma line only counts as a name when the flag appears within the
/// next three lines; once accepted, the scan for the block's own flag
/// line is unbounded. A name whose flag never arrives is still emitted
/// with an empty club rather than dropped.
///
/// Total over any input: no commas, or no input at all, yields an empty
/// vector.
pub fn parse_entrant_text(text: &str) -> Vec<FencerRecord> {
    let lines: Vec<&str> = text.lines().collect();
    let mut fencers = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if !line.contains(',') {
            i += 1;
            continue;
        }

        let window_end = (i + 1 + LOOKAHEAD_LINES).min(lines.len());
        let corroborated = lines[i + 1..window_end]
            .iter()
            .any(|la| la.trim().contains(FLAG_MARKER));
        if !corroborated {
            // A bare comma line with no nearby flag is almost always
            // prose, not a roster entry.
            i += 1;
            continue;
        }

        let name = line.to_string();
        let mut club = String::new();
        let mut j = i + 1;
        while j < lines.len() {
            if lines[j].trim().contains(FLAG_MARKER) {
                if let Some(club_line) = lines.get(j + 1) {
                    club = clean_club_line(club_line.trim());
                }
                break;
            }
            j += 1;
        }

        fencers.push(FencerRecord { name, club });
        // Resume at the flag line itself, not past it. The flag line
        // carries no comma so Scanning steps over it, but the exact
        // resumption point is load-bearing for back-to-back blocks and
        // is pinned by a test below.
        i = j;
    }

    fencers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Vec<(String, String)> {
        parse_entrant_text(text)
            .into_iter()
            .map(|f| (f.name, f.club))
            .collect()
    }

    #[test]
    fn strips_rank_markers_from_club_lines() {
        assert_eq!(clean_club_line("#3 Example Club"), "Example Club");
        assert_eq!(clean_club_line(""), "");
        assert_eq!(clean_club_line("No Rank Club"), "No Rank Club");
        assert_eq!(clean_club_line("#12 Club #7 Annex"), "Club  Annex");
    }

    #[test]
    fn parses_two_complete_blocks() {
        let text = "Doe, Jane\n🇺🇸\n#2 Fencing Club A\nSmith, Bob\n🇺🇸\nFencing Club B\n";
        assert_eq!(
            parsed(text),
            vec![
                ("Doe, Jane".to_string(), "Fencing Club A".to_string()),
                ("Smith, Bob".to_string(), "Fencing Club B".to_string()),
            ]
        );
    }

    #[test]
    fn empty_and_comma_free_input_yield_nothing() {
        assert!(parse_entrant_text("").is_empty());
        assert!(parse_entrant_text("no names here\njust words\n").is_empty());
    }

    #[test]
    fn comma_line_without_nearby_flag_is_prose() {
        let text = "Doe, Jane\nsome unrelated text\nmore text\nand more\nstill nothing\n";
        assert!(parse_entrant_text(text).is_empty());
    }

    #[test]
    fn flag_outside_lookahead_window_does_not_corroborate() {
        // Flag is four lines down; window covers only three.
        let text = "Doe, Jane\na\nb\nc\n🇺🇸\nClub\n";
        assert!(parse_entrant_text(text).is_empty());
    }

    #[test]
    fn dangling_name_without_terminating_flag_keeps_empty_club() {
        // Flag is the last line, so the club line never arrives. The
        // record is still emitted; partial beats silently dropped.
        let text = "Doe, Jane\n🇺🇸";
        assert_eq!(parsed(text), vec![("Doe, Jane".to_string(), String::new())]);
    }

    #[test]
    fn trailing_name_as_last_line_with_earlier_block_intact() {
        let text = "Doe, Jane\n🇺🇸\nClub A\nSmith, Bob\n🇺🇸";
        assert_eq!(
            parsed(text),
            vec![
                ("Doe, Jane".to_string(), "Club A".to_string()),
                ("Smith, Bob".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn resumes_scanning_at_the_flag_line_itself() {
        // Back-to-back blocks with zero separation: each extraction
        // stops at its own flag line, and the cursor restarts there.
        // If resumption moved past the flag line this would still pass,
        // so also plant a name candidate directly on the line after the
        // first flag's club line to pin re-scanning behavior.
        let text = "Doe, Jane\n🇺🇸\nClub A\nSmith, Bob\n🇺🇸\nClub B\nJones, Amy\n🇺🇸\nClub C";
        assert_eq!(
            parsed(text),
            vec![
                ("Doe, Jane".to_string(), "Club A".to_string()),
                ("Smith, Bob".to_string(), "Club B".to_string()),
                ("Jones, Amy".to_string(), "Club C".to_string()),
            ]
        );
    }

    #[test]
    fn coincidental_flag_in_window_still_corroborates() {
        // The check is pure substring presence; prose containing the
        // flag corroborates, and extraction treats that line as the
        // block's flag line.
        let text = "Doe, Jane\nproudly representing 🇺🇸 this year\nSome Club\n";
        assert_eq!(parsed(text), vec![("Doe, Jane".to_string(), "Some Club".to_string())]);
    }

    #[test]
    fn does_not_rematch_its_own_output() {
        let text = "Doe, Jane\n🇺🇸\nClub A\n";
        let first = parse_entrant_text(text);
        let replay = first
            .iter()
            .map(|f| f.name.clone())
            .collect::<Vec<_>>()
            .join("\n");
        // Names alone carry commas but no flag corroboration.
        assert!(parse_entrant_text(&replay).is_empty());
    }

    #[test]
    fn whitespace_around_lines_is_insignificant() {
        let text = "  Doe, Jane  \n  🇺🇸  \n   #1 Club A  \n";
        assert_eq!(parsed(text), vec![("Doe, Jane".to_string(), "Club A".to_string())]);
    }
}
