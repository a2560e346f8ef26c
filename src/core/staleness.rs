// RunShape - core/staleness.rs
//
// Detects documents that look like an authentication page instead of data.
// Advisory only: the result is reported in `meta.login_detected` and never
// suppresses extraction.

use crate::util::constants::LOGIN_MARKERS;

/// True if any login marker occurs anywhere in `raw`, ignoring case.
///
/// Always scans the full document, not a located fragment, so a login page
/// that happens to contain matchable markup is still flagged.
pub fn login_detected(raw: &str) -> bool {
    if raw.is_empty() {
        return false;
    }
    let lc = raw.to_lowercase();
    let hit = LOGIN_MARKERS.iter().find(|m| lc.contains(*m));
    if let Some(marker) = hit {
        tracing::debug!(marker, "Authentication marker found in input");
    }
    hit.is_some()
}
