mod from_google;
mod to_google;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use from_google::FromGoogle;
pub use to_google::ToGoogle;

/// The parts of a Calendar v3 event resource calsync reads and writes.
///
/// Event bodies go over the wire as JSON built from this struct, so
/// `extendedProperties.private` reaches Google as-is.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GoogleEvent {
    #[serde(skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(rename = "iCalUID", skip_serializing_if = "String::is_empty")]
    i_cal_uid: String,
    summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<GoogleTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<GoogleTime>,
    /// Set on instances of recurring events. Cancelled instances carry only this.
    #[serde(skip_serializing_if = "Option::is_none")]
    original_start_time: Option<GoogleTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtendedProperties {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    private: BTreeMap<String, String>,
}
