use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{PokedexId, TeamId},
    error::ApiError,
    protocol::{
        AbilityOption, AiStatus, AnalyzeResponse, DeleteTeamResponse, ItemSummary, MoveOption,
        PokemonDetails, RecommendResponse, ResultPage, SaveTeamResponse, SavedTeam,
        SearchResponse, TeamIdsRequest, TeamPayload, VulnerabilityReport,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{config::Settings, error::ClientError, query::SearchParams, CatalogSearch};

const ROSTER_CAPACITY: usize = 6;
const MIN_ITEM_QUERY_LEN: usize = 2;

/// Typed access to the team builder REST API.
#[derive(Clone)]
pub struct BuilderClient {
    http: Client,
    base: Url,
    access_token: Option<String>,
}

impl BuilderClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            base: parse_base_url(server_url)?,
            access_token: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base: parse_base_url(&settings.server_url)?,
            access_token: settings.access_token.clone(),
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn server_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::validation("server url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.access_token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }

    pub async fn search(&self, params: &SearchParams) -> Result<ResultPage, ClientError> {
        debug!(params = ?params.pairs(), "catalog search");
        let response = self
            .http
            .get(self.endpoint(&["pokemon", "search"])?)
            .query(params.pairs())
            .send()
            .await?;
        let body: SearchResponse = decode(response).await?;
        Ok(body.into())
    }

    pub async fn pokemon_details(&self, id: PokedexId) -> Result<PokemonDetails, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["pokemon", &id.to_string()])?)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn abilities(
        &self,
        id: PokedexId,
        filter: Option<&str>,
    ) -> Result<Vec<AbilityOption>, ClientError> {
        let mut request = self
            .http
            .get(self.endpoint(&["pokemon", &id.to_string(), "abilities"])?);
        if let Some(q) = filter.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("q", q)]);
        }
        decode(request.send().await?).await
    }

    pub async fn moves(
        &self,
        id: PokedexId,
        filter: Option<&str>,
    ) -> Result<Vec<MoveOption>, ClientError> {
        let mut request = self
            .http
            .get(self.endpoint(&["pokemon", &id.to_string(), "moves"])?);
        if let Some(q) = filter.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("q", q)]);
        }
        decode(request.send().await?).await
    }

    /// Item lookup by name prefix. Queries shorter than two characters
    /// return nothing without touching the network.
    pub async fn search_items(&self, q: &str) -> Result<Vec<ItemSummary>, ClientError> {
        let q = q.trim();
        if q.chars().count() < MIN_ITEM_QUERY_LEN {
            return Ok(Vec::new());
        }
        let response = self
            .http
            .get(self.endpoint(&["items", "search"])?)
            .query(&[("q", q)])
            .send()
            .await?;
        decode(response).await
    }

    /// Creates the team, or overwrites it when `payload.team_id` is set.
    pub async fn save_team(&self, payload: &TeamPayload) -> Result<SaveTeamResponse, ClientError> {
        if payload.team_members.is_empty() {
            return Err(ClientError::validation("team has no members"));
        }
        if payload.team_members.len() > ROSTER_CAPACITY {
            return Err(ClientError::RosterFull);
        }
        let request = self
            .http
            .post(self.endpoint(&["teams"])?)
            .json(payload);
        let response = self.authorized(request)?.send().await?;
        let saved: SaveTeamResponse = decode(response).await?;
        info!(team_id = %saved.team_id, team_name = %saved.team_name, "team saved");
        Ok(saved)
    }

    pub async fn delete_team(&self, team_id: &TeamId) -> Result<DeleteTeamResponse, ClientError> {
        let request = self.http.delete(self.endpoint(&["teams", &team_id.0])?);
        let response = self.authorized(request)?.send().await?;
        let deleted: DeleteTeamResponse = decode(response).await?;
        info!(team_id = %team_id, "team deleted");
        Ok(deleted)
    }

    pub async fn list_user_teams(&self, user: &str) -> Result<Vec<SavedTeam>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["teams", "user", user])?)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn team_vulnerability(
        &self,
        team: &[PokedexId],
    ) -> Result<VulnerabilityReport, ClientError> {
        if team.len() != ROSTER_CAPACITY {
            return Err(ClientError::validation(format!(
                "vulnerability analysis needs exactly {ROSTER_CAPACITY} members, got {}",
                team.len()
            )));
        }
        let query: Vec<(&str, u32)> = team.iter().map(|id| ("team_ids", id.0)).collect();
        let request = self
            .http
            .get(self.endpoint(&["teams", "vulnerability"])?)
            .query(&query);
        let response = self.authorized(request)?.send().await?;
        decode(response).await
    }

    pub async fn recommend(&self, team: &[PokedexId]) -> Result<RecommendResponse, ClientError> {
        if team.is_empty() {
            return Err(ClientError::validation(
                "add at least one member before asking for recommendations",
            ));
        }
        if team.len() >= ROSTER_CAPACITY {
            return Err(ClientError::RosterFull);
        }
        let response = self
            .http
            .post(self.endpoint(&["ai", "recommend"])?)
            .json(&TeamIdsRequest {
                team_ids: team.to_vec(),
            })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn analyze(&self, team: &[PokedexId]) -> Result<AnalyzeResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["ai", "analyze"])?)
            .json(&TeamIdsRequest {
                team_ids: team.to_vec(),
            })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn ai_status(&self) -> Result<AiStatus, ClientError> {
        let response = self.http.get(self.endpoint(&["ai", "status"])?).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl CatalogSearch for BuilderClient {
    async fn search(&self, params: &SearchParams) -> Result<ResultPage, ClientError> {
        BuilderClient::search(self, params).await
    }
}

fn parse_base_url(server_url: &str) -> Result<Url, ClientError> {
    let trimmed = server_url.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|err| ClientError::validation(format!("invalid server url '{trimmed}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::validation(format!(
            "server url must start with http:// or https://, got '{trimmed}'"
        )));
    }
    Ok(url)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::from_response(status.as_u16(), &body).into());
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
