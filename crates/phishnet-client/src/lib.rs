// SPDX-License-Identifier: GPL-3.0-or-later

//! Phish.net API client for fetching venue, show, and setlist data.
//!
//! The client wraps the Phish.net v3 REST endpoints, classifies the
//! service's error envelope, and flattens responses into row records that
//! can be shaped into a [`Table`]. Requests are issued one at a time and
//! paced by a simple rate limiter.

pub mod client;
mod de;
pub mod error;
pub mod models;
pub mod rate_limiter;
pub mod setlist_text;
pub mod table;

pub use client::{PhishNetClient, PhishNetClientBuilder, API_KEY_ENV_VAR};
pub use error::{PhishNetError, Result};
pub use models::{RequestInfo, Setlist, SetlistCollection, Show, Venue};
pub use setlist_text::clean_setlist;
pub use table::Table;
