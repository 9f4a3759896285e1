//! Server-rendered HTML.
//!
//! Every value taken from the source tables passes through
//! [`escape_html`] before it reaches the page.

use fitboard_scoring_models::TeamDetail;

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The dashboard shell. The page itself polls `/api/data`.
#[must_use]
pub fn index_page(title: &str, refresh_seconds: u64) -> String {
    INDEX_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{REFRESH_SECONDS}}", &refresh_seconds.to_string())
}

/// Member table of one team.
///
/// `updated_at` is the fetch time already formatted in the challenge
/// timezone.
#[must_use]
pub fn team_page(title: &str, detail: &TeamDetail, updated_at: &str) -> String {
    let team = escape_html(&detail.team_id);
    let mut rows = String::new();
    for member in &detail.members {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr>",
            escape_html(&member.name),
            member.run_walk,
            member.ride,
            member.total
        ));
    }
    if detail.members.is_empty() {
        rows.push_str(r#"<tr><td colspan="4">No activities recorded for this team.</td></tr>"#);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{team} | {title}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #1f2933; }}
table {{ border-collapse: collapse; min-width: 28rem; }}
th, td {{ padding: 0.4rem 0.8rem; border-bottom: 1px solid #d9e2ec; text-align: left; }}
td:nth-child(n+2), th:nth-child(n+2) {{ text-align: right; }}
.meta {{ color: #627d98; }}
</style>
</head>
<body>
<p><a href="/">&larr; Back to leaderboard</a></p>
<h1>{team}</h1>
<p class="meta">{count} members &middot; {total:.1} total points &middot; updated {updated}</p>
<table>
<thead><tr><th>Name</th><th>Run/Walk</th><th>Ride</th><th>Total</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</body>
</html>
"#,
        title = escape_html(title),
        count = detail.members.len(),
        total = detail.total,
        updated = escape_html(updated_at),
    )
}

/// Minimal page shown when the team page cannot be produced.
#[must_use]
pub fn error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Leaderboard unavailable</title></head>
<body>
<p><a href="/">&larr; Back to leaderboard</a></p>
<h1>Leaderboard unavailable</h1>
<p>{}</p>
</body>
</html>
"#,
        escape_html(message)
    )
}
