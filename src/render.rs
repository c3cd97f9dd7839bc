use crate::models::{EnrichedRecord, RosterResults};

const CLUB_NOT_FOUND: &str = "Club not found";
const CLUB_NOT_SPECIFIED: &str = "Club not specified";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Assembles the single page the service serves: the submission form,
/// and when a generate request just ran, the result list plus the CSV
/// export link. Everything user-derived is entity-escaped.
pub fn render_page(results: Option<&RosterResults>) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(PAGE_HEAD);
    out.push_str(FORM_TOP);
    if results.is_some() {
        out.push_str(
            r#"<a href="/export.csv" class="btn btn-outline-secondary">Export CSV</a>"#,
        );
    }
    out.push_str(FORM_BOTTOM);

    match results {
        Some(RosterResults::Events(events)) => {
            out.push_str("<div class=\"mt-4\"><h4>AskFred Results</h4>");
            if events.is_empty() {
                out.push_str(
                    "<ul class=\"list-group\"><li class=\"list-group-item\">\
                     No fencers found or processed for this tournament.</li></ul>",
                );
            }
            for event in events {
                out.push_str("<h5 class=\"mt-3\">");
                out.push_str(&escape_html(&event.name));
                out.push_str("</h5><ul class=\"list-group\">");
                for fencer in &event.fencers {
                    push_record(&mut out, fencer, CLUB_NOT_SPECIFIED);
                }
                out.push_str("</ul>");
            }
            out.push_str("</div>");
        }
        Some(RosterResults::Entrants(fencers)) => {
            out.push_str("<div class=\"mt-4\"><h4>USA Fencing Entrants</h4><ul class=\"list-group\">");
            if fencers.is_empty() {
                out.push_str(
                    "<li class=\"list-group-item\">No fencers processed from pasted text.</li>",
                );
            }
            for fencer in fencers {
                push_record(&mut out, fencer, CLUB_NOT_FOUND);
            }
            out.push_str("</ul></div>");
        }
        None => {}
    }

    out.push_str(PAGE_FOOT);
    out
}

fn push_record(out: &mut String, fencer: &EnrichedRecord, missing_club: &str) {
    out.push_str("<li class=\"list-group-item\"><a href=\"");
    out.push_str(&escape_html(&fencer.url));
    out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
    out.push_str(&escape_html(&fencer.name));
    out.push_str("</a><small>");
    if fencer.club.is_empty() {
        out.push_str(missing_club);
    } else {
        out.push_str(&escape_html(&fencer.club));
    }
    out.push_str("</small></li>");
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Fencing Profile Linker</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
        body { padding-top: 20px; padding-bottom: 50px; }
        .container { max-width: 700px; }
        textarea { resize: vertical; min-height: 100px; }
        .list-group-item small { color: #6c757d; display: block; }
        .list-group-item a { display: block; margin-bottom: 0.25rem; }
    </style>
</head>
<body>
<div class="container">
    <h2 class="mb-4">Fencing Profile Linker</h2>
"#;

const FORM_TOP: &str = r#"    <form method="post" action="/">
        <div class="mb-3">
            <label for="askfred_url_input" class="form-label">AskFred.net Tournament URL:</label>
            <input type="url" id="askfred_url_input" name="askfred_url" class="form-control" placeholder="https://www.askfred.net/tournaments/...">
        </div>
        <div class="text-center my-3">&mdash; OR &mdash;</div>
        <div class="mb-3">
            <label for="pasted_text_input" class="form-label">Paste USA Fencing Entrants:</label>
            <textarea id="pasted_text_input" name="pasted_text" rows="5" class="form-control" placeholder="Copy the list of fencers from the entrants page and paste it here."></textarea>
            <div class="form-text">Try to copy only the names/clubs/ratings. Extra text might interfere with parsing.</div>
        </div>
        <div class="d-flex justify-content-between align-items-center mt-4">
            <button type="submit" class="btn btn-primary">Generate Links</button>
"#;

const FORM_BOTTOM: &str = r#"        </div>
    </form>
"#;

const PAGE_FOOT: &str = r#"</div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventGroup;

    fn record(name: &str, club: &str) -> EnrichedRecord {
        EnrichedRecord {
            name: name.to_string(),
            club: club.to_string(),
            url: format!("https://fencingtracker.com/search?s={name}"),
        }
    }

    #[test]
    fn escapes_markup_sensitive_characters() {
        assert_eq!(
            escape_html(r#"<b>"Fenc'&er"</b>"#),
            "&lt;b&gt;&quot;Fenc&#39;&amp;er&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn bare_form_has_no_export_link() {
        let page = render_page(None);
        assert!(page.contains("Generate Links"));
        assert!(!page.contains("/export.csv"));
    }

    #[test]
    fn entrant_results_render_links_and_placeholders() {
        let results = RosterResults::Entrants(vec![
            record("Doe, Jane", "Club <A>"),
            record("Smith, Bob", ""),
        ]);
        let page = render_page(Some(&results));
        assert!(page.contains("USA Fencing Entrants"));
        assert!(page.contains("Doe, Jane"));
        assert!(page.contains("Club &lt;A&gt;"));
        assert!(page.contains(CLUB_NOT_FOUND));
        assert!(page.contains("/export.csv"));
    }

    #[test]
    fn event_results_are_grouped_under_headings() {
        let results = RosterResults::Events(vec![EventGroup {
            name: "Senior Mixed Epee".to_string(),
            fencers: vec![record("Doe, Jane", "")],
        }]);
        let page = render_page(Some(&results));
        assert!(page.contains("AskFred Results"));
        assert!(page.contains("Senior Mixed Epee"));
        assert!(page.contains(CLUB_NOT_SPECIFIED));
    }

    #[test]
    fn empty_entrant_results_show_placeholder_row() {
        let page = render_page(Some(&RosterResults::Entrants(Vec::new())));
        assert!(page.contains("No fencers processed from pasted text."));
    }
}
