//! Typed correlation ids for buttons and select menus.
//!
//! A component's custom id round-trips through the platform and carries the
//! handler key plus whatever state the handler needs later:
//!
//! ```text
//! <key>/v<version>/<field>/<field>/...
//! ```
//!
//! The key stays the first `/`-segment so the dispatcher can route on it
//! without knowing the record. Fields are percent-escaped (`%` → `%25`,
//! `/` → `%2F`), so a field may contain any text. An absent optional field is
//! encoded as an empty segment.

use std::str::FromStr;

use crate::error::{CustomIdError, CustomIdResult};
use crate::message::CUSTOM_ID_LIMIT;

/// A record that can be carried in a component custom id.
pub trait CorrelationRecord: Sized {
    /// Handler key, the first segment of the id.
    const KEY: &'static str;
    /// Layout version; bumped whenever the field layout changes.
    const VERSION: u32;
    /// Number of fields the layout carries.
    const FIELD_COUNT: usize;

    /// Serialises the record into unescaped fields.
    fn to_fields(&self) -> Vec<String>;

    /// Rebuilds the record from unescaped fields. `fields.len()` is
    /// guaranteed to equal [`Self::FIELD_COUNT`].
    fn from_fields(fields: &[String]) -> CustomIdResult<Self>;

    /// Encodes the record as a custom id.
    fn encode(&self) -> CustomIdResult<String> {
        encode(self)
    }

    /// Decodes a custom id into the record.
    fn decode(custom_id: &str) -> CustomIdResult<Self> {
        decode(custom_id)
    }
}

/// Returns the handler key of a custom id: everything before the first `/`.
pub fn handler_key(custom_id: &str) -> &str {
    custom_id.split('/').next().unwrap_or(custom_id)
}

/// Encodes `record` as `<key>/v<version>/<fields...>`.
pub fn encode<R: CorrelationRecord>(record: &R) -> CustomIdResult<String> {
    let mut out = format!("{}/v{}", R::KEY, R::VERSION);
    for field in record.to_fields() {
        out.push('/');
        out.push_str(&escape(&field));
    }
    let length = out.chars().count();
    if length > CUSTOM_ID_LIMIT {
        return Err(CustomIdError::TooLong {
            length,
            limit: CUSTOM_ID_LIMIT,
        });
    }
    Ok(out)
}

/// Decodes a custom id produced by [`encode`].
pub fn decode<R: CorrelationRecord>(custom_id: &str) -> CustomIdResult<R> {
    let mut segments = custom_id.split('/');
    let key = segments.next().unwrap_or_default();
    if key != R::KEY {
        return Err(CustomIdError::KeyMismatch {
            expected: R::KEY,
            found: key.to_string(),
        });
    }

    let version = segments.next().unwrap_or_default();
    if version.strip_prefix('v').and_then(|v| v.parse::<u32>().ok()) != Some(R::VERSION) {
        return Err(CustomIdError::VersionMismatch {
            key: R::KEY,
            expected: R::VERSION,
            found: version.to_string(),
        });
    }

    let fields = segments
        .enumerate()
        .map(|(index, raw)| {
            unescape(raw).ok_or_else(|| CustomIdError::InvalidField {
                key: R::KEY,
                index,
                reason: format!("bad escape in `{raw}`"),
            })
        })
        .collect::<CustomIdResult<Vec<_>>>()?;

    if fields.len() != R::FIELD_COUNT {
        return Err(CustomIdError::FieldCount {
            key: R::KEY,
            expected: R::FIELD_COUNT.to_string(),
            found: fields.len(),
        });
    }

    R::from_fields(&fields)
}

/// Parses a required field.
pub fn parse_field<R: CorrelationRecord, T: FromStr>(
    fields: &[String],
    index: usize,
) -> CustomIdResult<T> {
    let raw = fields.get(index).ok_or_else(|| CustomIdError::FieldCount {
        key: R::KEY,
        expected: R::FIELD_COUNT.to_string(),
        found: fields.len(),
    })?;
    raw.parse().map_err(|_| CustomIdError::InvalidField {
        key: R::KEY,
        index,
        reason: format!("cannot parse `{raw}`"),
    })
}

/// Parses an optional field; an empty segment means `None`.
pub fn parse_optional_field<R: CorrelationRecord, T: FromStr>(
    fields: &[String],
    index: usize,
) -> CustomIdResult<Option<T>> {
    match fields.get(index) {
        Some(raw) if raw.is_empty() => Ok(None),
        _ => parse_field::<R, T>(fields, index).map(Some),
    }
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3)?;
        match code.to_ascii_uppercase().as_str() {
            "25" => out.push('%'),
            "2F" => out.push('/'),
            _ => return None,
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct PageId {
        page: String,
        owner: u64,
        note: Option<String>,
    }

    impl CorrelationRecord for PageId {
        const KEY: &'static str = "page";
        const VERSION: u32 = 2;
        const FIELD_COUNT: usize = 3;

        fn to_fields(&self) -> Vec<String> {
            vec![
                self.page.clone(),
                self.owner.to_string(),
                self.note.clone().unwrap_or_default(),
            ]
        }

        fn from_fields(fields: &[String]) -> CustomIdResult<Self> {
            Ok(Self {
                page: parse_field::<Self, _>(fields, 0)?,
                owner: parse_field::<Self, _>(fields, 1)?,
                note: parse_optional_field::<Self, _>(fields, 2)?,
            })
        }
    }

    #[test]
    fn test_slash_in_field_survives() {
        let record = PageId {
            page: "Web/API/fetch 100%".into(),
            owner: 7,
            note: None,
        };
        let id = record.encode().unwrap();
        assert_eq!(id, "page/v2/Web%2FAPI%2Ffetch 100%25/7/");
        assert_eq!(handler_key(&id), "page");
        assert_eq!(PageId::decode(&id).unwrap(), record);
    }

    #[test]
    fn test_decode_rejects_foreign_ids() {
        assert!(matches!(
            PageId::decode("other/v2/a/1/"),
            Err(CustomIdError::KeyMismatch { .. })
        ));
        assert!(matches!(
            PageId::decode("page/v1/a/1/"),
            Err(CustomIdError::VersionMismatch { .. })
        ));
        assert!(matches!(
            PageId::decode("page/v2/a/1"),
            Err(CustomIdError::FieldCount { found: 2, .. })
        ));
        assert!(matches!(
            PageId::decode("page/v2/a/x/"),
            Err(CustomIdError::InvalidField { index: 1, .. })
        ));
        assert!(matches!(
            PageId::decode("page/v2/a%zz/1/"),
            Err(CustomIdError::InvalidField { index: 0, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_oversized_ids() {
        let record = PageId {
            page: "p".repeat(120),
            owner: 1,
            note: None,
        };
        assert!(matches!(
            record.encode(),
            Err(CustomIdError::TooLong { .. })
        ));
    }

    #[test]
    fn test_handler_key_without_separator() {
        assert_eq!(handler_key("deletebtn"), "deletebtn");
        assert_eq!(handler_key(""), "");
    }
}
