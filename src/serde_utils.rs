//! Serde helpers shared by the request types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// Deserialize `Option<Option<T>>` to distinguish between missing field and null value.
///
/// - Missing field → `None`
/// - Field is `null` → `Some(None)`
/// - Field has value → `Some(Some(value))`
///
/// Usage:
/// ```ignore
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Example {
///     #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
///     parent_id: Option<Option<i64>>,
/// }
/// ```
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    struct DoubleOptionVisitor<T> {
        _inner: PhantomData<T>,
    }

    impl<'de, T: Deserialize<'de>> serde::de::Visitor<'de> for DoubleOptionVisitor<T> {
        type Value = Option<Option<T>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("option")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(None))
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            T::deserialize(deserializer).map(|val| Some(Some(val)))
        }
    }

    de.deserialize_option(DoubleOptionVisitor {
        _inner: PhantomData,
    })
}

/// A timestamp, or a bare `YYYY-MM-DD` date read as midnight.
#[derive(Deserialize)]
#[serde(untagged)]
enum DateOrDateTime {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl From<DateOrDateTime> for NaiveDateTime {
    fn from(value: DateOrDateTime) -> Self {
        match value {
            DateOrDateTime::DateTime(dt) => dt,
            DateOrDateTime::Date(date) => date.and_time(NaiveTime::MIN),
        }
    }
}

/// Deserialize an optional timestamp that may also be given as a plain date.
pub fn optional_datetime<'de, D>(de: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateOrDateTime>::deserialize(de).map(|value| value.map(Into::into))
}

/// [`double_option`] for timestamps that may also be given as a plain date.
pub fn double_option_datetime<'de, D>(de: D) -> Result<Option<Option<NaiveDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    double_option::<DateOrDateTime, D>(de).map(|value| value.map(|inner| inner.map(Into::into)))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        list_id: Option<Option<i64>>,
    }

    #[test]
    fn missing_null_and_value_are_distinct() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.list_id, None);

        let null: Patch = serde_json::from_str(r#"{"list_id": null}"#).unwrap();
        assert_eq!(null.list_id, Some(None));

        let value: Patch = serde_json::from_str(r#"{"list_id": 7}"#).unwrap();
        assert_eq!(value.list_id, Some(Some(7)));
    }

    #[derive(Deserialize)]
    struct Due {
        #[serde(default, deserialize_with = "super::optional_datetime")]
        due_date: Option<NaiveDateTime>,
        #[serde(default, deserialize_with = "super::double_option_datetime")]
        moved_to: Option<Option<NaiveDateTime>>,
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn bare_date_reads_as_midnight() {
        let due: Due = serde_json::from_str(r#"{"due_date": "2025-06-01"}"#).unwrap();
        assert_eq!(due.due_date, Some(midnight(2025, 6, 1)));
        assert_eq!(due.moved_to, None);

        let due: Due = serde_json::from_str(r#"{"moved_to": "2025-06-02"}"#).unwrap();
        assert_eq!(due.moved_to, Some(Some(midnight(2025, 6, 2))));
    }

    #[test]
    fn full_timestamp_and_null_still_accepted() {
        let due: Due = serde_json::from_str(
            r#"{"due_date": "2025-06-01T17:30:00", "moved_to": null}"#,
        )
        .unwrap();
        assert_eq!(
            due.due_date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(17, 30, 0)
        );
        assert_eq!(due.moved_to, Some(None));

        let due: Due = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(due.due_date, None);
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(serde_json::from_str::<Due>(r#"{"due_date": "June 1st"}"#).is_err());
    }
}
