//! Listing view model: one fetch, then local search by name.

use schoolhouse_model::{SchoolRecord, filter_by_name};

use crate::api::{FETCH_FALLBACK, SchoolApi};
use crate::error::ClientError;

/// Shown while the records are being fetched.
pub const LOADING_MESSAGE: &str = "Loading schools…";
/// Shown when a fetch fails without a reason.
pub const ERROR_FALLBACK: &str = "Something went wrong";
/// Shown when the service has no records at all.
pub const EMPTY_MESSAGE: &str = "No schools found.";

/// What the listing currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    /// Fetch in progress.
    Loading,
    /// Fetch failed with this message.
    Error(String),
    /// Records fetched, newest first.
    Loaded(Vec<SchoolRecord>),
}

/// Outcome of rendering the loaded listing against the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingContent<'a> {
    /// A status line instead of cards.
    Message(String),
    /// Matching records in listing order.
    Cards(Vec<&'a SchoolRecord>),
}

/// The school listing.
#[derive(Debug, Clone)]
pub struct ListingView {
    state: ListingState,
    query: String,
}

impl Default for ListingView {
    fn default() -> Self {
        Self {
            state: ListingState::Loading,
            query: String::new(),
        }
    }
}

impl ListingView {
    /// A view waiting for its first fetch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches every record and settles into loaded or error.
    pub async fn load<A: SchoolApi + ?Sized>(&mut self, api: &A) {
        self.state = match api.list_schools().await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "schools fetched");
                ListingState::Loaded(records)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch schools");
                ListingState::Error(error_message(&e))
            }
        };
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// Current query, as typed.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the query. Filtering is recomputed on the next [`ListingView::display`].
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Records matching the query; empty unless loaded.
    #[must_use]
    pub fn visible(&self) -> Vec<&SchoolRecord> {
        match &self.state {
            ListingState::Loaded(records) => filter_by_name(records, &self.query),
            _ => Vec::new(),
        }
    }

    /// What to show for the current state and query.
    #[must_use]
    pub fn display(&self) -> ListingContent<'_> {
        match &self.state {
            ListingState::Loading => ListingContent::Message(LOADING_MESSAGE.to_owned()),
            ListingState::Error(message) => ListingContent::Message(message.clone()),
            ListingState::Loaded(records) if records.is_empty() => ListingContent::Message(EMPTY_MESSAGE.to_owned()),
            ListingState::Loaded(records) => {
                let matches = filter_by_name(records, &self.query);
                if matches.is_empty() {
                    ListingContent::Message(format!("No results for “{}”.", self.query))
                } else {
                    ListingContent::Cards(matches)
                }
            }
        }
    }
}

fn error_message(error: &ClientError) -> String {
    let message = match error {
        ClientError::Api { .. } => error.server_message().unwrap_or(FETCH_FALLBACK).to_owned(),
        other => other.to_string(),
    };
    if message.trim().is_empty() {
        ERROR_FALLBACK.to_owned()
    } else {
        message
    }
}
