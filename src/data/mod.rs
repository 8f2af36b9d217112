//! Upstream data sources.

pub mod github;

pub use github::GithubClient;
