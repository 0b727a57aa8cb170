//! Ports implemented by the infrastructure layer

mod repositories;

pub use repositories::{RepoResult, ReviewFilter, ReviewStore, ReviewTransaction};
