//! Suggested file names for workspaces and submission exports.
//!
//! Names are ASCII-only: `[A-Za-z0-9-]` plus a fixed extension.

use chrono::{Datelike, Local, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("valid separator regex"));
static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9-]").expect("valid disallowed-char regex"));
static DASH_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid dash regex"));

/// Reduces free text to a file-name-safe segment.
///
/// Whitespace and underscore runs become `-`, other non-alphanumeric
/// characters (including non-ASCII letters) are dropped, and dashes are
/// collapsed and trimmed. May return an empty string.
pub fn sanitize_file_name_segment(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let dashed = SEPARATOR_RUN_RE.replace_all(trimmed, "-");
    let allowed = DISALLOWED_RE.replace_all(&dashed, "");
    let collapsed = DASH_RUN_RE.replace_all(&allowed, "-");
    collapsed.trim_matches('-').to_string()
}

/// `Y2025-M10-D20`
pub fn format_date_stamp(now: &impl Datelike) -> String {
    format!("Y{}-M{:02}-D{:02}", now.year(), now.month(), now.day())
}

/// `14-30-45`
pub fn format_time_stamp(now: &impl Timelike) -> String {
    format!("{:02}-{:02}-{:02}", now.hour(), now.minute(), now.second())
}

/// `<title>-<date>-<time>.luna`, or `<date>-<time>.luna` for an empty title.
pub fn suggest_workspace_file_name<T>(title: &str, now: &T) -> String
where
    T: Datelike + Timelike,
{
    join_with_stamp(&[sanitize_file_name_segment(title)], now, "luna")
}

/// `suggest_workspace_file_name` stamped with the local wall-clock time.
pub fn suggest_workspace_file_name_now(title: &str) -> String {
    suggest_workspace_file_name(title, &Local::now())
}

/// `first-middle-last-<date>-<time>.pdf`; missing or blank name parts are skipped.
pub fn submission_pdf_file_name<T>(
    first_name: Option<&str>,
    middle_name: Option<&str>,
    last_name: Option<&str>,
    now: &T,
) -> String
where
    T: Datelike + Timelike,
{
    let parts = [first_name, middle_name, last_name]
        .into_iter()
        .flatten()
        .map(sanitize_file_name_segment)
        .collect::<Vec<_>>();
    join_with_stamp(&parts, now, "pdf")
}

/// `submission_pdf_file_name` stamped with the local wall-clock time.
pub fn submission_pdf_file_name_now(
    first_name: Option<&str>,
    middle_name: Option<&str>,
    last_name: Option<&str>,
) -> String {
    submission_pdf_file_name(first_name, middle_name, last_name, &Local::now())
}

fn join_with_stamp<T>(parts: &[String], now: &T, extension: &str) -> String
where
    T: Datelike + Timelike,
{
    let mut segments = parts
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>();
    segments.push(format_date_stamp(now));
    segments.push(format_time_stamp(now));
    format!("{}.{extension}", segments.join("-"))
}
