// SPDX-License-Identifier: GPL-3.0-or-later

use crate::de::KeyedRow;
use crate::error::{PhishNetError, Result};
use crate::models::{Envelope, Payload, RequestInfo, Setlist, SetlistCollection, Show, Venue};
use crate::rate_limiter::RateLimiter;
use crate::setlist_text::clean_setlist;
use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};
use url::Url;

const PHISHNET_API_BASE: &str = "https://api.phish.net/v3";
const USER_AGENT: &str = concat!("phishnet-client/", env!("CARGO_PKG_VERSION"));
const API_KEY_MASK: &str = "<<apikey>>";

/// Environment variable read by [`PhishNetClient::from_env`].
pub const API_KEY_ENV_VAR: &str = "PHISH_API_KEY";

/// Year of the earliest show in the Phish.net database.
pub const FIRST_SHOW_YEAR: i32 = 1983;

/// The shows endpoint stops returning rows at this count.
pub const DEFAULT_TRUNCATION_THRESHOLD: u64 = 300;

pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 120;

const VENUES_ALL: &str = "/venues/all";
const SHOWS_QUERY: &str = "/shows/query/";
const SETLISTS_GET: &str = "/setlists/get";

/// Phish.net v3 API client.
#[derive(Clone)]
pub struct PhishNetClient {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limiter: RateLimiter,
    first_year: i32,
    truncation_threshold: u64,
    last_request: Arc<Mutex<Option<RequestInfo>>>,
}

impl fmt::Debug for PhishNetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhishNetClient")
            .field("base_url", &self.base_url)
            .field("api_key", &API_KEY_MASK)
            .field("rate_limiter", &self.rate_limiter)
            .field("first_year", &self.first_year)
            .field("truncation_threshold", &self.truncation_threshold)
            .finish()
    }
}

impl PhishNetClient {
    /// Create a new client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client using the key stored in `PHISH_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(API_KEY_ENV_VAR).ok())
    }

    /// Build from the value of `PHISH_API_KEY`, if it was set.
    pub(crate) fn from_env_value(api_key: Option<String>) -> Result<Self> {
        Self::builder().optional_api_key(api_key).build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> PhishNetClientBuilder {
        PhishNetClientBuilder::default()
    }

    /// Fetch every venue known to Phish.net.
    ///
    /// # Example
    /// ```no_run
    /// # use phishnet_client::PhishNetClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = PhishNetClient::from_env()?;
    /// let venues = client.get_all_venues().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_all_venues(&self) -> Result<Vec<Venue>> {
        let payload: Payload<Venue> = self.get(VENUES_ALL, &[]).await?;
        debug!(target: "phishnet", "fetched {} venues", payload.data.len());
        Ok(payload.data)
    }

    /// Fetch all shows in `year`, oldest first.
    ///
    /// The service caps this endpoint, so a year at or above the truncation
    /// threshold is logged as possibly incomplete.
    pub async fn get_shows_by_year(&self, year: i32) -> Result<Vec<Show>> {
        let params = [("year", year.to_string()), ("order", "ASC".to_string())];
        let payload: Payload<Show> = self.get(SHOWS_QUERY, &params).await?;

        let count = payload.count.unwrap_or(payload.data.len() as u64);
        if count >= self.truncation_threshold {
            warn!(
                target: "phishnet",
                year,
                count,
                "the year {} has {} or more shows, this query is missing data",
                year,
                self.truncation_threshold
            );
        }

        debug!(target: "phishnet", year, "fetched {} shows", payload.data.len());
        Ok(payload.data)
    }

    /// Fetch shows for every year in `years`, concatenated in year order.
    pub async fn get_shows_for_years(&self, years: RangeInclusive<i32>) -> Result<Vec<Show>> {
        let mut all_shows = Vec::new();
        for year in years {
            let year_shows = self.get_shows_by_year(year).await?;
            all_shows.extend(year_shows);
        }
        Ok(all_shows)
    }

    /// Fetch shows for every year from the first year through the current one.
    pub async fn get_all_shows(&self) -> Result<Vec<Show>> {
        let current_year = Utc::now().year();
        info!(
            target: "phishnet",
            "fetching shows for {}..={}",
            self.first_year,
            current_year
        );
        let shows = self
            .get_shows_for_years(self.first_year..=current_year)
            .await?;
        info!(target: "phishnet", "fetched {} shows in total", shows.len());
        Ok(shows)
    }

    /// Fetch the setlist for a single show.
    ///
    /// Returns zero rows when the show has no setlist on Phish.net, otherwise
    /// one row with `setlistdata_clean` filled in.
    pub async fn get_setlist(&self, show_id: u64) -> Result<Vec<Setlist>> {
        let params = [("showid", show_id.to_string())];
        let payload: Payload<Setlist> = self.get(SETLISTS_GET, &params).await?;

        let mut setlists = payload.data;
        for setlist in &mut setlists {
            setlist.setlistdata_clean = setlist.setlistdata.as_deref().map(clean_setlist);
        }
        Ok(setlists)
    }

    /// Fetch setlists for each show in `shows`, in order.
    ///
    /// Shows without a setlist are skipped and reported in
    /// [`SetlistCollection::missing_show_ids`], so the output may be shorter
    /// than the input.
    pub async fn get_all_setlists(&self, shows: &[Show]) -> Result<SetlistCollection> {
        let mut collection = SetlistCollection::default();

        for show in shows {
            let setlist = self.get_setlist(show.showid).await?;
            if setlist.is_empty() {
                collection.missing_show_ids.push(show.showid);
            } else {
                collection.setlists.extend(setlist);
            }
        }

        if !collection.missing_show_ids.is_empty() {
            warn!(
                target: "phishnet",
                "there are {} shows that do not have a setlist populated on Phish.net",
                collection.missing_show_ids.len()
            );
        }

        Ok(collection)
    }

    /// First year queried by [`PhishNetClient::get_all_shows`].
    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    /// The most recent request, with the API key masked.
    pub async fn last_request(&self) -> Option<RequestInfo> {
        self.last_request.lock().await.clone()
    }

    /// Internal method to perform a rate-limited GET and unwrap the envelope.
    async fn get<T: DeserializeOwned + KeyedRow>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Payload<T>> {
        self.rate_limiter.acquire().await;

        let endpoint_url = format!("{}{}", self.base_url.trim_end_matches('/'), endpoint);
        let mut url = Url::parse(&endpoint_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apikey", &self.api_key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        let info = self.request_info(&endpoint_url, &url);
        trace!(target: "phishnet", "GET {}", info.url);
        *self.last_request.lock().await = Some(info);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!(target: "phishnet", "response status: {}", status);

        let response = response.error_for_status()?;
        let body = response.text().await?;
        trace!(target: "phishnet", "response body: {}", body);

        let envelope: Envelope = serde_json::from_str(&body)?;
        if envelope.error_code != Some(0) {
            return Err(PhishNetError::Api {
                code: envelope.error_code,
                message: envelope
                    .error_message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let payload = envelope.response.ok_or_else(|| {
            PhishNetError::InvalidResponse("missing response object".to_string())
        })?;
        Ok(serde_json::from_value(payload)?)
    }

    fn request_info(&self, endpoint_url: &str, url: &Url) -> RequestInfo {
        let url = self.mask(url.as_str());
        let query_string = url.replacen(endpoint_url, "", 1);
        RequestInfo {
            endpoint: endpoint_url.to_string(),
            url,
            query_string,
        }
    }

    fn mask(&self, value: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(self.api_key.as_bytes()).collect();
        value
            .replace(&encoded, API_KEY_MASK)
            .replace(&self.api_key, API_KEY_MASK)
    }
}

/// Builder for configuring a Phish.net client.
#[derive(Debug)]
pub struct PhishNetClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    rate_limit_interval: Duration,
    first_year: i32,
    truncation_threshold: u64,
}

impl Default for PhishNetClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: PHISHNET_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit_interval: RateLimiter::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
                .min_interval(),
            first_year: FIRST_SHOW_YEAR,
            truncation_threshold: DEFAULT_TRUNCATION_THRESHOLD,
        }
    }
}

impl PhishNetClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API key from an optional source such as configuration.
    pub fn optional_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow at most `per_minute` requests per minute; `0` disables pacing.
    pub fn request_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_interval = RateLimiter::per_minute(per_minute).min_interval();
        self
    }

    /// Set rate limit interval between requests.
    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// First year queried by [`PhishNetClient::get_all_shows`].
    pub fn first_year(mut self, year: i32) -> Self {
        self.first_year = year;
        self
    }

    /// Show count at which a year is reported as possibly truncated.
    pub fn truncation_threshold(mut self, threshold: u64) -> Self {
        self.truncation_threshold = threshold;
        self
    }

    /// Build the client. Fails if no non-blank API key was provided.
    pub fn build(self) -> Result<PhishNetClient> {
        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(PhishNetError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(PhishNetClient {
            client,
            base_url: self.base_url,
            api_key,
            rate_limiter: RateLimiter::new(self.rate_limit_interval),
            first_year: self.first_year,
            truncation_threshold: self.truncation_threshold,
            last_request: Arc::new(Mutex::new(None)),
        })
    }
}
