//! GitHub REST API access shared by the domain remotes.

pub mod client;
pub mod insights;
pub mod models;

pub use client::{GitHubClient, RateLimiter};
pub use insights::{AdminStats, ContributorRole, LanguageShare, RepoReport, TrafficStats};
