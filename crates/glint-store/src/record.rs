use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Fixed key prefix namespacing every persisted field.
pub const KEY_PREFIX: &str = "glint_takeover_";

pub const KEY_ACTIVE: &str = "glint_takeover_active";
pub const KEY_KIND: &str = "glint_takeover_kind";
pub const KEY_FILE: &str = "glint_takeover_file";
pub const KEY_URL: &str = "glint_takeover_url";

/// All keys a record occupies, in write order.
pub const RECORD_KEYS: [&str; 4] = [KEY_ACTIVE, KEY_KIND, KEY_FILE, KEY_URL];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    File,
    Url,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Url => write!(f, "url"),
        }
    }
}

impl std::str::FromStr for TargetKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "url" => Ok(Self::Url),
            other => Err(format!("unknown target kind: {other}")),
        }
    }
}

/// The persisted takeover record. Written on every transition, read once
/// at startup, cleared on deactivation. Never trusted blindly: startup
/// reconciliation re-verifies it against the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TakeoverRecord {
    pub active: bool,
    pub target_kind: TargetKind,
    pub file_ref: String,
    pub url_ref: String,
}

impl TakeoverRecord {
    pub fn file(file_ref: impl Into<String>) -> Self {
        Self {
            active: true,
            target_kind: TargetKind::File,
            file_ref: file_ref.into(),
            url_ref: String::new(),
        }
    }

    /// Serialize to `(key, value)` string pairs for the KV store.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (KEY_ACTIVE, self.active.to_string()),
            (KEY_KIND, self.target_kind.to_string()),
            (KEY_FILE, self.file_ref.clone()),
            (KEY_URL, self.url_ref.clone()),
        ]
    }

    /// Rebuild a record from stored pairs. Returns `Ok(None)` when no
    /// record was written (the active key is absent). Validation is
    /// lenient where loose strings were historically stored (an unknown
    /// kind falls back to `file`), but a present-yet-unparseable flag is
    /// an invalid record, not an active one.
    pub fn from_pairs<'a, F>(mut get: F) -> Result<Option<Self>, StoreError>
    where
        F: FnMut(&str) -> Option<&'a str>,
    {
        let Some(active_raw) = get(KEY_ACTIVE) else {
            return Ok(None);
        };
        let active = match active_raw {
            "true" => true,
            "false" => false,
            other => {
                return Err(StoreError::InvalidRecord(format!(
                    "active flag: {other:?}"
                )))
            }
        };
        let target_kind = get(KEY_KIND)
            .and_then(|s| s.parse().ok())
            .unwrap_or(TargetKind::File);
        Ok(Some(Self {
            active,
            target_kind,
            file_ref: get(KEY_FILE).unwrap_or_default().to_string(),
            url_ref: get(KEY_URL).unwrap_or_default().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pairs_to_map(record: &TakeoverRecord) -> HashMap<&'static str, String> {
        record.to_pairs().into_iter().collect()
    }

    #[test]
    fn pairs_roundtrip() {
        let record = TakeoverRecord::file("promo.html");
        let map = pairs_to_map(&record);
        let back = TakeoverRecord::from_pairs(|k| map.get(k).map(String::as_str))
            .unwrap()
            .unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn absent_record_reads_as_none() {
        let result = TakeoverRecord::from_pairs(|_| None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn garbage_active_flag_is_invalid_not_active() {
        let mut map = pairs_to_map(&TakeoverRecord::file("promo.html"));
        map.insert(KEY_ACTIVE, "yes please".to_string());
        let err = TakeoverRecord::from_pairs(|k| map.get(k).map(String::as_str)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
    }

    #[test]
    fn unknown_kind_defaults_to_file() {
        let mut map = pairs_to_map(&TakeoverRecord::file("promo.html"));
        map.insert(KEY_KIND, "hologram".to_string());
        let back = TakeoverRecord::from_pairs(|k| map.get(k).map(String::as_str))
            .unwrap()
            .unwrap();
        assert_eq!(back.target_kind, TargetKind::File);
    }

    #[test]
    fn all_keys_share_the_prefix() {
        for key in RECORD_KEYS {
            assert!(key.starts_with(KEY_PREFIX), "key {key}");
        }
    }

    #[test]
    fn target_kind_parse_roundtrip() {
        for kind in [TargetKind::File, TargetKind::Url] {
            let parsed: TargetKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("neither".parse::<TargetKind>().is_err());
    }
}
