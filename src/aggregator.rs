//! Concurrent fetch-and-aggregate pipeline.
//!
//! One call fans out into the five endpoint requests, waits for every one of
//! them to settle, and only then decodes and reduces the bodies into a
//! `ProfileSnapshot`. Any failure discards everything else.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::github::{Credential, Endpoint, Transport};
use crate::models::{PullRequestSearch, RepositorySummary, Shape, StarSearch, UserProfile, decode};
use crate::stats::ProfileSnapshot;

pub struct StatsAggregator<T> {
    transport: T,
}

impl<T: Transport> StatsAggregator<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn fetch_snapshot(
        &self,
        username: &str,
        credential: Option<&Credential>,
    ) -> Result<ProfileSnapshot, FetchError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FetchError::InvalidInput);
        }

        info!(username, authenticated = credential.is_some(), "fetching snapshot");

        let get = |endpoint: Endpoint| {
            let request = endpoint.request(username);
            async move { self.transport.get_json(&request, credential).await }
        };

        // Wait for all five; no short-circuit on the first error.
        let (profile, repos, stars, pulls, events) = tokio::join!(
            get(Endpoint::Profile),
            get(Endpoint::Repos),
            get(Endpoint::Stars),
            get(Endpoint::PullRequests),
            get(Endpoint::Events),
        );

        let profile = settle::<UserProfile>(Endpoint::Profile, profile, Shape::Object);
        let repos = settle::<Vec<RepositorySummary>>(Endpoint::Repos, repos, Shape::Array);
        let stars = settle::<StarSearch>(Endpoint::Stars, stars, Shape::Object);
        let pulls = settle::<PullRequestSearch>(Endpoint::PullRequests, pulls, Shape::Object);
        // Any JSON body will do; only transport and parse failures count.
        let events = events.map_err(|e| {
            warn!(endpoint = %Endpoint::Events, "request failed: {e:#}");
            FetchError::failed(Endpoint::Events, e)
        });

        let profile = profile?;
        let repos = repos?;
        let stars = stars?;
        let pulls = pulls?;
        let events = events?;

        match events.as_array() {
            Some(list) => debug!(events = list.len(), "recent activity fetched but not aggregated"),
            None => debug!("recent activity body is not a list; ignored"),
        }

        let snapshot = ProfileSnapshot::new(profile, repos, stars.total_count, &pulls.items);
        info!(
            username,
            repos = snapshot.stats.total_repos,
            stars = snapshot.stats.total_stars,
            prs = snapshot.stats.total_prs,
            merged = snapshot.stats.merged_prs,
            "snapshot ready"
        );

        Ok(snapshot)
    }
}

/// Decode one endpoint's settled response, logging any failure so that
/// errors behind the first reported one are still visible.
fn settle<D: DeserializeOwned>(
    endpoint: Endpoint,
    response: Result<Value>,
    shape: Shape,
) -> Result<D, FetchError> {
    response
        .and_then(|body| decode::<D>(body, shape))
        .map_err(|e| {
            warn!(%endpoint, "request failed: {e:#}");
            FetchError::failed(endpoint, e)
        })
}
