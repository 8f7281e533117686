pub mod client;
pub mod error;
pub mod provisioner;
pub mod types;

pub use client::GitHubClient;
pub use error::{GitHubError, Result};
pub use provisioner::{repository_name, RepositoryProvisioner};
pub use types::{NewRepository, Repository, SourceHost};
