//! Query-string parameters and their conversion into engine queries.

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::error::AppError;
use crate::query::SightingQuery;

/// Formats accepted for `startDate`/`endDate`, tried in order after the
/// default ISO-8601 parser.
const EXTRA_TIMESTAMP_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// `GET /sightings/query` parameters, still in their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingQueryParams {
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_id_as_none")]
    pub bird_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SightingQueryParams {
    /// Parse the timestamps. A malformed value fails the whole request even if
    /// the branch finally chosen would not have used it.
    pub fn into_query(self) -> Result<SightingQuery, AppError> {
        Ok(SightingQuery {
            location: self.location,
            bird_id: self.bird_id,
            start: self
                .start_date
                .as_deref()
                .map(|raw| parse_timestamp("startDate", raw))
                .transpose()?,
            end: self
                .end_date
                .as_deref()
                .map(|raw| parse_timestamp("endDate", raw))
                .transpose()?,
        })
    }
}

/// `birdId=` with nothing after it means no bird filter at all.
fn empty_id_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

pub fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, AppError> {
    let raw = raw.trim();
    if let Ok(parsed) = raw.parse::<NaiveDateTime>() {
        return Ok(parsed);
    }
    EXTRA_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "{field} must be a date and time like 2024-05-01T10:30:00, got {raw:?}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;
    use chrono::NaiveDate;

    fn parse_uri(uri: &str) -> Option<SightingQueryParams> {
        let uri: Uri = uri.parse().unwrap();
        Query::<SightingQueryParams>::try_from_uri(&uri)
            .ok()
            .map(|Query(params)| params)
    }

    #[test]
    fn empty_bird_id_is_absent() {
        let params = parse_uri("/sightings/query?birdId=&location=Park").unwrap();
        assert_eq!(params.bird_id, None);
        assert_eq!(params.location.as_deref(), Some("Park"));

        assert_eq!(parse_uri("/sightings/query?birdId=7").unwrap().bird_id, Some(7));
        assert_eq!(parse_uri("/sightings/query").unwrap().bird_id, None);
        assert!(parse_uri("/sightings/query?birdId=seven").is_none());
    }

    #[test]
    fn accepts_iso_with_and_without_seconds() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        for raw in ["2024-05-01T10:30:00", "2024-05-01T10:30", "2024-05-01 10:30:00"] {
            assert_eq!(parse_timestamp("startDate", raw).unwrap(), expected);
        }
    }

    #[test]
    fn malformed_timestamp_is_bad_request() {
        let params = SightingQueryParams {
            end_date: Some("yesterday".to_string()),
            ..SightingQueryParams::default()
        };
        assert!(matches!(
            params.into_query(),
            Err(AppError::BadRequest(msg)) if msg.contains("endDate")
        ));
    }
}
