//! The persisted user table.
//!
//! On disk the document is a single flat JSON object: user-id keys map to
//! user records and the reserved `next_reset` key holds the next weekly reset
//! time. Any other top-level entry is kept as-is so that a save never drops
//! data this crate does not understand.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::user::{UserId, UserRecord};

/// Reserved top-level key for the next weekly reset.
pub const NEXT_RESET_KEY: &str = "next_reset";
/// Format of the `next_reset` value (UTC).
pub const NEXT_RESET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// User records in document order.
    pub users: IndexMap<UserId, UserRecord>,
    /// Raw `next_reset` string as stored.
    pub next_reset: Option<String>,
    /// Top-level entries that are neither users nor `next_reset`.
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut UserRecord> {
        self.users.get_mut(&id)
    }

    /// Return the user's record, creating it if absent.
    ///
    /// A non-empty `username` that differs from the stored one replaces it.
    /// The flag is true when anything changed and the document needs saving.
    pub fn ensure_user(
        &mut self,
        id: UserId,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> (&mut UserRecord, bool) {
        let mut changed = false;
        let user = match self.users.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                // An unparseable record under the same key is superseded.
                self.extra.shift_remove(&id.to_string());
                changed = true;
                entry.insert(UserRecord::new(id, username, now))
            }
        };

        if let Some(name) = username.filter(|n| !n.is_empty()) {
            if user.username != name {
                user.username = name.to_string();
                changed = true;
            }
        }
        (user, changed)
    }

    /// Parsed `next_reset`, if present and well-formed.
    pub fn next_reset_at(&self) -> Option<NaiveDateTime> {
        self.next_reset
            .as_deref()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, NEXT_RESET_FORMAT).ok())
    }

    /// Store `at` as the next reset, replacing any malformed raw value.
    pub fn set_next_reset(&mut self, at: NaiveDateTime) {
        self.extra.shift_remove(NEXT_RESET_KEY);
        self.next_reset = Some(at.format(NEXT_RESET_FORMAT).to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.next_reset.is_none() && self.extra.is_empty()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The parsed `next_reset` shadows a raw one left in `extra`.
        let extra: Vec<_> = self
            .extra
            .iter()
            .filter(|(key, _)| self.next_reset.is_none() || key.as_str() != NEXT_RESET_KEY)
            .collect();
        let len = self.users.len() + extra.len() + usize::from(self.next_reset.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (id, user) in &self.users {
            map.serialize_entry(&id.to_string(), user)?;
        }
        if let Some(next_reset) = &self.next_reset {
            map.serialize_entry(NEXT_RESET_KEY, next_reset)?;
        }
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a JSON object of user records")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Document, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut doc = Document::default();

                while let Some(key) = map.next_key::<String>()? {
                    let value: serde_json::Value = map.next_value()?;

                    if key == NEXT_RESET_KEY {
                        if let serde_json::Value::String(raw) = value {
                            doc.next_reset = Some(raw);
                        } else {
                            doc.extra.insert(key, value);
                        }
                        continue;
                    }

                    match parse_user_key(&key) {
                        Some(id) if value.is_object() => {
                            match serde_json::from_value::<UserRecord>(value.clone()) {
                                Ok(mut user) => {
                                    if user.username.is_empty() {
                                        user.username = UserRecord::default_username(id);
                                    }
                                    doc.users.insert(id, user);
                                }
                                Err(e) => {
                                    tracing::warn!(user_id = id, error = %e, "skipping unreadable user record");
                                    doc.extra.insert(key, value);
                                }
                            }
                        }
                        _ => {
                            doc.extra.insert(key, value);
                        }
                    }
                }

                Ok(doc)
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Canonical decimal user id keys only, so a key always round-trips.
fn parse_user_key(key: &str) -> Option<UserId> {
    let id: UserId = key.parse().ok()?;
    (id.to_string() == key).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn mixed_schema_is_split_by_shape() {
        let json = r#"{
            "101": {"username": "alice", "xp": 50},
            "next_reset": "2025-03-17 00:00:00",
            "202": {"username": "bob", "xp": 10},
            "motd": "hello",
            "303": "not a user"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        assert_eq!(doc.users.len(), 2);
        assert_eq!(doc.users.keys().copied().collect::<Vec<_>>(), vec![101, 202]);
        assert_eq!(doc.next_reset.as_deref(), Some("2025-03-17 00:00:00"));
        assert_eq!(doc.extra.len(), 2);
        assert!(doc.extra.contains_key("303"));
        assert_eq!(
            doc.next_reset_at(),
            NaiveDateTime::parse_from_str("2025-03-17 00:00:00", NEXT_RESET_FORMAT).ok()
        );
    }

    #[test]
    fn serialization_is_stable() {
        let mut doc = Document::new();
        doc.ensure_user(1, Some("alice"), now());
        doc.ensure_user(2, None, now());
        doc.set_next_reset(now().naive_utc());
        doc.extra.insert("motd".into(), serde_json::json!("hi"));

        let first = serde_json::to_string_pretty(&doc).unwrap();
        let reloaded: Document = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string_pretty(&reloaded).unwrap();
        assert_eq!(first, second);
        assert_eq!(reloaded, doc);
    }

    #[test]
    fn ensure_user_syncs_non_empty_username() {
        let mut doc = Document::new();
        let (_, created) = doc.ensure_user(5, Some("old"), now());
        assert!(created);

        let (_, changed) = doc.ensure_user(5, Some(""), now());
        assert!(!changed);
        let (_, changed) = doc.ensure_user(5, None, now());
        assert!(!changed);

        let (user, changed) = doc.ensure_user(5, Some("new"), now());
        assert!(changed);
        assert_eq!(user.username, "new");
    }

    #[test]
    fn ensure_user_supersedes_unreadable_record() {
        let json = r#"{"9": {"xp": "lots"}}"#;
        let mut doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.users.is_empty());
        assert!(doc.extra.contains_key("9"));

        doc.ensure_user(9, None, now());
        assert!(doc.extra.is_empty());
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["9"]["xp"], 0);
    }

    #[test]
    fn non_canonical_numeric_key_is_not_a_user() {
        let json = r#"{"007": {"xp": 1}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.users.is_empty());
        assert!(doc.extra.contains_key("007"));
    }

    #[test]
    fn set_next_reset_replaces_malformed_value() {
        let json = r#"{"1": {"xp": 5}, "next_reset": null}"#;
        let mut doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.next_reset.is_none());
        assert!(doc.extra.contains_key(NEXT_RESET_KEY));

        doc.set_next_reset(now().naive_utc());
        assert!(doc.extra.is_empty());
        let out = serde_json::to_string(&doc).unwrap();
        assert_eq!(out.matches("\"next_reset\"").count(), 1);
        assert!(out.contains("\"next_reset\":\"2025-03-10 12:00:00\""));
    }

    #[test]
    fn parsed_next_reset_shadows_raw_extra_entry() {
        let mut doc = Document::new();
        doc.extra.insert(NEXT_RESET_KEY.into(), serde_json::Value::Null);
        doc.next_reset = Some("2025-03-17 00:00:00".into());
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["next_reset"], "2025-03-17 00:00:00");
        assert_eq!(out.as_object().unwrap().len(), 1);
    }

    #[test]
    fn user_without_username_loads_with_default_name() {
        let doc: Document = serde_json::from_str(r#"{"12": {"xp": 3}}"#).unwrap();
        assert_eq!(doc.user(12).unwrap().username, "User12");
    }
}
