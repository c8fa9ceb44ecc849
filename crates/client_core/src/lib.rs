use async_trait::async_trait;
use shared::protocol::ResultPage;

pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod pagination;
pub mod query;
pub mod roster;

pub use client::BuilderClient;
pub use controller::{SearchController, SearchEvent, SearchOptions, SearchSnapshot};
pub use error::ClientError;
pub use query::{build_request, QueryState, SearchParams, SortKey};
pub use roster::{MemberBuild, Roster, RosterMember};

/// Catalog search backend consumed by [`SearchController`].
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<ResultPage, ClientError>;
}
