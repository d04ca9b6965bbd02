//! Runner-id payload validation.

use std::sync::OnceLock;

use regex::Regex;

static RUNNER_ID: OnceLock<Regex> = OnceLock::new();

/// Check whether a decoded payload is a well-formed runner id.
///
/// Runner badges encode a UUID in canonical hyphenated form; matching is
/// case-insensitive. Anything else (URLs, Wi-Fi setup codes, stray text on
/// posters behind the table) is rejected before it reaches the backend.
pub fn is_runner_id(payload: &str) -> bool {
    let re = RUNNER_ID.get_or_init(|| {
        // Compiled once; the pattern is a literal and cannot fail.
        Regex::new(
            r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
        )
        .unwrap()
    });
    re.is_match(payload)
}
