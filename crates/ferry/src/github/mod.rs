//! GitHub destination platform support.

mod client;
mod types;

pub use client::GithubClient;
pub use types::{GithubRepo, GithubUser};
