// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{
    opt_i64_from_any, opt_string_from_any, opt_u64_from_any, rows_from_keyed_or_list,
    u64_from_any, KeyedRow,
};

/// Venue record from `/venues/all`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Venue {
    /// Phish.net venue ID.
    #[serde(deserialize_with = "u64_from_any")]
    pub venueid: u64,
    /// Venue name.
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub country: Option<String>,
    /// Link to the venue page on phish.net.
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub link: Option<String>,
    /// Columns not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl KeyedRow for Venue {
    const ID_FIELD: &'static str = "venueid";
}

/// Show record from `/shows/query/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Show {
    /// Phish.net show ID.
    #[serde(deserialize_with = "u64_from_any")]
    pub showid: u64,
    /// Show date (YYYY-MM-DD).
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub showdate: Option<String>,
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    pub artistid: Option<u64>,
    /// Name the artist was billed as (e.g. "Phish", "Trey Anastasio Band").
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub billed_as: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub link: Option<String>,
    /// Human readable "City, State, Country".
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub location: Option<String>,
    /// Venue name, sometimes wrapped in an HTML anchor.
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub setlistnotes: Option<String>,
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    pub venueid: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    pub tourid: Option<u64>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub tourname: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub tour_when: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub artistlink: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl KeyedRow for Show {
    const ID_FIELD: &'static str = "showid";
}

/// Setlist record from `/setlists/get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setlist {
    #[serde(deserialize_with = "u64_from_any")]
    pub showid: u64,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub showdate: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub short_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub long_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub relative_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub gapchart: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    pub artistid: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    pub venueid: Option<u64>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub location: Option<String>,
    /// Raw HTML setlist body.
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub setlistdata: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub setlistnotes: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub rating: Option<String>,
    /// Plain-text rendering of `setlistdata`, filled in by the client.
    #[serde(default)]
    pub setlistdata_clean: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl KeyedRow for Setlist {
    const ID_FIELD: &'static str = "showid";
}

/// Aggregated result of fetching setlists for many shows.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SetlistCollection {
    /// One record per show that has a setlist, in input order.
    pub setlists: Vec<Setlist>,
    /// Shows for which the service returned no setlist.
    pub missing_show_ids: Vec<u64>,
}

/// Description of the most recent request with the API key masked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    /// Endpoint URL without query string.
    pub endpoint: String,
    /// Full request URL.
    pub url: String,
    /// Query string portion of `url`, including the leading `?`.
    pub query_string: String,
}

/// Top-level response envelope shared by every v3 endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default, deserialize_with = "opt_i64_from_any")]
    pub error_code: Option<i64>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub response: Option<Value>,
}

/// The `response` member of the envelope.
///
/// `data` may be a list of rows or an object of rows keyed by id.
#[derive(Debug, Deserialize)]
pub(crate) struct Payload<T: serde::de::DeserializeOwned + KeyedRow> {
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    pub count: Option<u64>,
    #[serde(default = "Vec::new", deserialize_with = "rows_from_keyed_or_list")]
    pub data: Vec<T>,
}
