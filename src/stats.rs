use serde::Serialize;

use crate::models::{PullRequestRecord, RepositorySummary, UserProfile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total_repos: u64,
    pub total_stars: u64,
    pub total_prs: u64,
    pub merged_prs: u64,
}

impl AggregateStats {
    /// `total_stars` is the count the starred search reports, not a sum
    /// over `repos`.
    pub fn derive(
        repos: &[RepositorySummary],
        total_stars: u64,
        pull_requests: &[PullRequestRecord],
    ) -> Self {
        let merged_prs = pull_requests.iter().filter(|pr| pr.is_merged()).count();

        Self {
            total_repos: repos.len() as u64,
            total_stars,
            total_prs: pull_requests.len() as u64,
            merged_prs: merged_prs as u64,
        }
    }
}

/// Result of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub profile: UserProfile,
    pub repos: Vec<RepositorySummary>,
    pub stats: AggregateStats,
}

impl ProfileSnapshot {
    pub fn new(
        profile: UserProfile,
        repos: Vec<RepositorySummary>,
        total_stars: u64,
        pull_requests: &[PullRequestRecord],
    ) -> Self {
        let stats = AggregateStats::derive(&repos, total_stars, pull_requests);
        Self {
            profile,
            repos,
            stats,
        }
    }
}
