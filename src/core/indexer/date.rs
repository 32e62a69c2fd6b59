//! `Date` header normalization.
//!
//! Corpus dates look like `Thu, 2 Nov 2000 08:12:00 -0800 (PST)`. The
//! index expects `yyyy/MM/dd HH:mm:ss Z`, i.e. `2000/11/02 08:12:00
//! -0800`. The parenthesised zone name is informational and dropped
//! before parsing; the numeric offset is authoritative. The weekday is
//! not checked against the calendar date, so a mislabelled day still
//! parses.

use chrono::DateTime;

/// Format of the `Date` header once the weekday and zone comment are removed
const HEADER_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

/// Format the index mapping declares for `headers.Date`
pub const INDEX_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S %z";

/// Rewrite a raw `Date` header value into index format
///
/// Returns `None` when the value cannot be parsed, including a value
/// whose only zone information is a name (`... 08:12:00 PST`).
pub fn normalize_date(raw: &str) -> Option<String> {
    let value = strip_weekday(strip_zone_comment(raw.trim()))?;
    let parsed = DateTime::parse_from_str(value, HEADER_FORMAT).ok()?;
    Some(parsed.format(INDEX_DATE_FORMAT).to_string())
}

/// Drop the leading `<weekday>, `
///
/// The weekday must be a three-letter day name.
fn strip_weekday(value: &str) -> Option<&str> {
    let (day, rest) = value.split_once(',')?;
    let known = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .any(|name| name.eq_ignore_ascii_case(day.trim()));
    known.then(|| rest.trim_start())
}

/// Drop a trailing `(ZONE)` comment, if any
fn strip_zone_comment(value: &str) -> &str {
    if value.ends_with(')') {
        if let Some(open) = value.rfind('(') {
            return value[..open].trim_end();
        }
    }
    value
}
