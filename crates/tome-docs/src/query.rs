//! `<branch>:<query>` grammar of library documentation lookups.

/// A query split into the branch it targets and the search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery<'a> {
    pub branch: &'a str,
    pub query: &'a str,
}

/// Splits `text` on its first `:` when the prefix names a known branch.
///
/// Otherwise the whole text is the query and `default_branch` is used, so
/// member queries such as `Client#event:ready` stay intact.
pub fn parse_source_query<'a>(
    text: &'a str,
    default_branch: &'a str,
    is_known: impl Fn(&str) -> bool,
) -> SourceQuery<'a> {
    let text = text.trim();
    if let Some((prefix, rest)) = text.split_once(':') {
        let prefix = prefix.trim();
        if is_known(prefix) {
            return SourceQuery {
                branch: prefix,
                query: rest.trim(),
            };
        }
    }
    SourceQuery {
        branch: default_branch,
        query: text,
    }
}
