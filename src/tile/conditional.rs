//! HTTP date handling for conditional tile requests.

use chrono::{DateTime, NaiveDateTime, Utc};
use http::header::{HeaderName, IF_MODIFIED_SINCE, IF_UNMODIFIED_SINCE};
use http::HeaderMap;

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date.
///
/// Accepts IMF-fixdate (and other RFC 2822 forms), the obsolete RFC 850 form,
/// and the asctime form. Returns `None` for anything else.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Ok(time) = DateTime::parse_from_rfc2822(&value) {
        return Some(time.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&value, "%A, %d-%b-%y %H:%M:%S GMT")
        .or_else(|_| NaiveDateTime::parse_from_str(&value, "%a %b %d %H:%M:%S %Y"))
        .ok()
        .map(|time| time.and_utc())
}

/// Conditional request headers relevant to tile responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preconditions {
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl Preconditions {
    /// Read `If-Modified-Since` and `If-Unmodified-Since`.
    ///
    /// Headers that are not valid HTTP dates are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let date = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_http_date)
        };

        Self {
            if_modified_since: date(IF_MODIFIED_SINCE),
            if_unmodified_since: date(IF_UNMODIFIED_SINCE),
        }
    }

    /// Whether a resource last modified at `modified` should be answered with
    /// `304 Not Modified`.
    ///
    /// True when `modified` is at or before `If-Modified-Since`, or strictly
    /// after `If-Unmodified-Since`.
    pub fn not_modified(&self, modified: DateTime<Utc>) -> bool {
        self.if_modified_since.is_some_and(|since| modified <= since)
            || self.if_unmodified_since.is_some_and(|since| modified > since)
    }
}
