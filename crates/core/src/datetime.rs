//! Backend timestamp handling.
//!
//! The backend serializes datetimes as `DD/MM/YYYY HH:MM:SS`; older endpoints
//! and fixtures may emit RFC 3339. Anything else is treated as absent.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

/// Wire format used by the backend.
pub const BACKEND_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Parse a backend timestamp. Returns `None` for empty or unrecognized input.
pub fn parse_backend(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, BACKEND_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    tracing::debug!(value = raw, "unrecognized backend timestamp");
    None
}

/// Render a timestamp the way the screens show it; absent values read `N/A`.
pub fn display(value: Option<&NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(BACKEND_FORMAT).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// `#[serde(with = "inventario_core::datetime::lenient")]` for optional timestamps.
pub mod lenient {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(BACKEND_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(default, with = "lenient")]
        at: Option<NaiveDateTime>,
    }

    #[test]
    fn parses_backend_format() {
        let dt = parse_backend("05/03/2024 14:07:09").unwrap();
        assert_eq!((dt.day(), dt.month(), dt.year()), (5, 3, 2024));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 7, 9));
    }

    #[test]
    fn accepts_rfc3339_and_rejects_garbage() {
        assert!(parse_backend("2024-03-05T14:07:09Z").is_some());
        assert!(parse_backend("2024-03-05T14:07:09").is_some());
        assert!(parse_backend("ayer").is_none());
        assert!(parse_backend("").is_none());
    }

    #[test]
    fn missing_and_null_fields_deserialize_to_none() {
        let a: Stamped = serde_json::from_str(r#"{"at": null}"#).unwrap();
        let b: Stamped = serde_json::from_str(r#"{}"#).unwrap();
        let c: Stamped = serde_json::from_str(r#"{"at": "??"}"#).unwrap();
        assert!(a.at.is_none() && b.at.is_none() && c.at.is_none());
        assert_eq!(display(a.at.as_ref()), "N/A");
    }

    #[test]
    fn serializes_back_to_backend_format() {
        let s = Stamped { at: parse_backend("01/12/2023 08:00:00") };
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"at":"01/12/2023 08:00:00"}"#);
    }
}
