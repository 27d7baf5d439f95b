//! Record types shared by the catalog, navigation, and rendering stages.
//!
//! [`ComicRecord`] is the persisted shape of one catalog entry. It is built
//! explicitly from fields: a record is never patched in place, enrichment
//! produces a new value via [`ComicRecord::with_dimensions`].

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::SystemTime;

/// A UTC instant with millisecond precision.
///
/// Serialized as `YYYY-MM-DDTHH:MM:SS.sssZ`. Values are truncated to whole
/// milliseconds on construction so a timestamp compares the same before and
/// after a save/load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        Self::from_datetime(time.into())
    }

    /// Parse an RFC 3339 / ISO-8601 string with an explicit offset.
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
    }

    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Human date for listings, e.g. `March 4, 2019`.
    pub fn display_date(&self) -> String {
        self.0.format("%B %-d, %Y").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

/// One comic in the catalog.
///
/// `width`/`height` are absent in catalogs written before dimensions were
/// tracked; their absence marks the record for enrichment, never an error.
/// Keys this program does not know about are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicRecord {
    pub filename: String,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ComicRecord {
    pub fn new(filename: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            filename: filename.into(),
            created_at,
            width: None,
            height: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Both dimensions, if the record has been enriched.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    pub fn needs_dimensions(&self) -> bool {
        self.dimensions().is_none()
    }

    /// A copy of this record with missing dimensions filled in.
    ///
    /// A width or height the record already carries is kept.
    pub fn with_dimensions(&self, width: u32, height: u32) -> Self {
        Self {
            filename: self.filename.clone(),
            created_at: self.created_at,
            width: self.width.or(Some(width)),
            height: self.height.or(Some(height)),
            extra: self.extra.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_serializes_with_millis_and_z() {
        let ts = Timestamp::parse("2019-03-04T12:34:56.789Z").unwrap();
        assert_eq!(ts.to_iso_string(), "2019-03-04T12:34:56.789Z");
    }

    #[test]
    fn timestamp_whole_seconds_keep_zero_millis() {
        let ts = Timestamp::parse("2019-03-04T12:34:56Z").unwrap();
        assert_eq!(ts.to_iso_string(), "2019-03-04T12:34:56.000Z");
    }

    #[test]
    fn timestamp_offset_normalized_to_utc() {
        let ts = Timestamp::parse("2019-03-04T14:34:56.000+02:00").unwrap();
        assert_eq!(ts.to_iso_string(), "2019-03-04T12:34:56.000Z");
    }

    #[test]
    fn timestamp_truncates_sub_millisecond_precision() {
        let ts = Timestamp::parse("2019-03-04T12:34:56.789999Z").unwrap();
        assert_eq!(ts, Timestamp::parse("2019-03-04T12:34:56.789Z").unwrap());
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse("2019-03-04").is_err());
    }

    #[test]
    fn timestamp_display_date() {
        let ts = Timestamp::parse("2019-03-04T12:34:56.000Z").unwrap();
        assert_eq!(ts.display_date(), "March 4, 2019");
    }

    #[test]
    fn timestamps_order_chronologically() {
        let early = Timestamp::parse("2018-12-31T23:59:59.999Z").unwrap();
        let late = Timestamp::parse("2019-01-01T00:00:00.000Z").unwrap();
        assert!(early < late);
    }

    #[test]
    fn record_without_dimensions_omits_keys() {
        let record = ComicRecord::new(
            "first-strip.png",
            Timestamp::parse("2019-03-04T12:34:56.000Z").unwrap(),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"filename":"first-strip.png","createdAt":"2019-03-04T12:34:56.000Z"}"#
        );
    }

    #[test]
    fn record_with_dimensions_serializes_in_field_order() {
        let record = ComicRecord::new(
            "a.png",
            Timestamp::parse("2019-03-04T12:34:56.000Z").unwrap(),
        )
        .with_dimensions(800, 600);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"filename":"a.png","createdAt":"2019-03-04T12:34:56.000Z","width":800,"height":600}"#
        );
    }

    #[test]
    fn record_preserves_unknown_keys() {
        let json = r#"{"filename":"a.png","createdAt":"2019-03-04T12:34:56.000Z","alt":"A cat"}"#;
        let record: ComicRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.extra.get("alt").and_then(|v| v.as_str()), Some("A cat"));
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn half_enriched_record_still_needs_dimensions() {
        let json = r#"{"filename":"a.png","createdAt":"2019-03-04T12:34:56.000Z","width":800}"#;
        let record: ComicRecord = serde_json::from_str(json).unwrap();
        assert!(record.needs_dimensions());
    }

    #[test]
    fn with_dimensions_keeps_existing_values() {
        let json = r#"{"filename":"a.png","createdAt":"2019-03-04T12:34:56.000Z","width":1234}"#;
        let record: ComicRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.with_dimensions(640, 480).dimensions(), Some((1234, 480)));
    }

    #[test]
    fn with_dimensions_leaves_original_untouched() {
        let original = ComicRecord::new(
            "a.png",
            Timestamp::parse("2019-03-04T12:34:56.000Z").unwrap(),
        );
        let enriched = original.with_dimensions(10, 20);
        assert!(original.needs_dimensions());
        assert_eq!(enriched.dimensions(), Some((10, 20)));
        assert_eq!(enriched.created_at, original.created_at);
    }
}
