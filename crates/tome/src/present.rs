//! Text shaping shared by the lookup commands.

use tome_core::{OPTION_TEXT_LIMIT, UserId, truncate};

const QUERY_ECHO_LIMIT: usize = 100;
const OPTION_DESCRIPTION_KEEP: usize = 96;
const NO_DESCRIPTION: &str = "No description provided";

/// Shortens a query echoed back to the user: 100 characters or more are cut
/// to the first 100, followed by `...`.
pub fn shorten_query(query: &str) -> String {
    if query.chars().count() >= QUERY_ECHO_LIMIT {
        let mut out: String = query.chars().take(QUERY_ECHO_LIMIT).collect();
        out.push_str("...");
        out
    } else {
        query.to_string()
    }
}

/// Description shown under a select option.
///
/// Missing or blank descriptions become "No description provided"; 99
/// characters or more are cut to 96 followed by `...`.
pub fn option_description(description: Option<&str>) -> String {
    let text = description.map(str::trim).filter(|d| !d.is_empty()).unwrap_or(NO_DESCRIPTION);
    if text.chars().count() >= OPTION_TEXT_LIMIT - 1 {
        let mut out: String = text.chars().take(OPTION_DESCRIPTION_KEEP).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}

/// Label of a page locator in menus and suggestions.
///
/// Long locators keep only their last two path segments.
pub fn locator_label(locator: &str) -> String {
    if locator.chars().count() < OPTION_TEXT_LIMIT - 1 {
        return locator.to_string();
    }
    let segments: Vec<&str> = locator.rsplitn(3, '/').take(2).collect();
    let tail = segments.into_iter().rev().collect::<Vec<_>>().join("/");
    truncate(&tail, OPTION_TEXT_LIMIT)
}

/// `Sent by <@initiator>`, plus `for <@target>` when there is one.
pub fn sent_by(initiator: UserId, target: Option<UserId>) -> String {
    match target {
        Some(target) => format!("Sent by {} for {}", initiator.mention(), target.mention()),
        None => format!("Sent by {}", initiator.mention()),
    }
}
