use chrono::NaiveDate;

use crate::age;
use crate::models::PLACEHOLDER;
use crate::stats::ProfileSnapshot;

const MIN_ALIGN_WIDTH: usize = 40;

/// Text card for a snapshot: one header per section and dot-leader rows.
pub fn render_text(snapshot: &ProfileSnapshot, today: NaiveDate) -> String {
    let profile = &snapshot.profile;
    let stats = &snapshot.stats;

    let member_for = profile
        .created_at
        .as_deref()
        .and_then(|c| age::member_for(c, today))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let profile_rows = vec![
        ("Name", profile.display_name().to_string()),
        ("Username", profile.display_login().to_string()),
        ("Bio", profile.display_bio().to_string()),
        ("Followers", profile.followers.to_string()),
        ("Following", profile.following.to_string()),
        ("Public Repos", profile.public_repos.to_string()),
        ("Member For", member_for),
        ("Profile", profile.display_url().to_string()),
    ];

    let stat_rows = vec![
        ("Total Repositories", stats.total_repos.to_string()),
        ("Total Stars", stats.total_stars.to_string()),
        ("Total PRs", stats.total_prs.to_string()),
        ("Merged PRs", stats.merged_prs.to_string()),
    ];

    let repo_rows: Vec<(&str, String)> = snapshot
        .repos
        .iter()
        .map(|r| (r.name.as_str(), r.html_url.clone()))
        .collect();

    let align_width = profile_rows
        .iter()
        .chain(&stat_rows)
        .chain(&repo_rows)
        .map(|(k, v)| k.len() + v.len() + 4)
        .max()
        .unwrap_or(0)
        .max(MIN_ALIGN_WIDTH);

    let mut out = String::new();
    push_section(&mut out, "GitHub Profile", &profile_rows, align_width);
    out.push('\n');
    push_section(&mut out, "GitHub Stats", &stat_rows, align_width);

    if !repo_rows.is_empty() {
        out.push('\n');
        push_section(&mut out, "Repositories", &repo_rows, align_width);
    }

    out
}

fn push_section(out: &mut String, label: &str, rows: &[(&str, String)], align_width: usize) {
    out.push_str(&build_header_line(label, align_width));
    out.push('\n');
    for (key, value) in rows {
        let (key_part, dots, value) = build_stat_row(key, value, align_width);
        out.push_str(&format!("{key_part}{dots}{value}\n"));
    }
}

pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.len() + value.len();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        n => format!("{} ", ".".repeat(n - 1)),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.len());
    format!("{base}{}", "-".repeat(dash_count))
}
