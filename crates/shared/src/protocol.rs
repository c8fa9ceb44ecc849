use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{CategoryTag, PokedexId, StatBlock, TeamId};

/// One species record as returned by the catalog search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    pub pokedex_id: PokedexId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<CategoryTag>,
    #[serde(default)]
    pub stats: Option<StatBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sprite_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_banned: bool,
}

impl CatalogEntity {
    pub fn stats_or_default(&self) -> StatBlock {
        self.stats.unwrap_or_default()
    }
}

/// Catalog search response. Older servers return a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Paged {
        total: u64,
        results: Vec<CatalogEntity>,
    },
    Legacy(Vec<CatalogEntity>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<CatalogEntity>,
    pub total_count: u64,
}

impl ResultPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<SearchResponse> for ResultPage {
    fn from(value: SearchResponse) -> Self {
        match value {
            SearchResponse::Paged { total, results } => Self {
                items: results,
                total_count: total,
            },
            SearchResponse::Legacy(results) => Self {
                total_count: results.len() as u64,
                items: results,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityOption {
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOption {
    pub name: String,
    #[serde(default)]
    pub learn_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonDetails {
    pub pokedex_id: PokedexId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<CategoryTag>,
    #[serde(default)]
    pub stats: Option<StatBlock>,
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub abilities: Vec<AbilityOption>,
    #[serde(default)]
    pub moves_pool: Vec<MoveOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PokemonDetails {
    pub fn sprite_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/{}.png",
            self.pokedex_id
        )
    }

    pub fn to_entity(&self) -> CatalogEntity {
        CatalogEntity {
            pokedex_id: self.pokedex_id,
            name: self.name.clone(),
            types: self.types.clone(),
            stats: self.stats,
            sprite_url: self.sprite_url(),
            is_banned: self.is_banned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    #[serde(default)]
    pub item_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub sprite_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberPayload {
    pub base_pokemon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tera_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(default)]
    pub moves: Vec<String>,
    /// Training points keyed by wire stat name.
    #[serde(default)]
    pub evs: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    pub team_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub format: String,
    pub team_members: Vec<TeamMemberPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveTeamResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub team_id: TeamId,
    pub team_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTeamResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedTeam {
    pub id: TeamId,
    pub team_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub team_members: Vec<TeamMemberPayload>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts naive ISO timestamps as well as RFC 3339 ones; anything else
/// is treated as missing.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        raw.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&raw).ok().map(|dt| dt.naive_utc()))
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamIdsRequest {
    pub team_ids: Vec<PokedexId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubScores {
    #[serde(default)]
    pub defensive: f64,
    #[serde(default)]
    pub offensive: f64,
    #[serde(default)]
    pub diversity: f64,
    #[serde(default)]
    pub stats: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recommendation {
    pub pokedex_id: PokedexId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<CategoryTag>,
    #[serde(default)]
    pub sprite_url: String,
    #[serde(default)]
    pub stats: Option<StatBlock>,
    pub score: f64,
    #[serde(default)]
    pub scores: SubScores,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Recommendation {
    pub fn to_entity(&self) -> CatalogEntity {
        CatalogEntity {
            pokedex_id: self.pokedex_id,
            name: self.name.clone(),
            types: self.types.clone(),
            stats: self.stats,
            sprite_url: self.sprite_url.clone(),
            is_banned: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub team_size: usize,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub analysis: Value,
}

impl AnalyzeResponse {
    pub fn major_weakness(&self) -> Option<&str> {
        self.analysis.get("major_weakness").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VulnerabilityReport {
    pub most_vulnerable_type: String,
    #[serde(default)]
    pub max_multiplier: f64,
    #[serde(default)]
    pub is_balanced: bool,
    #[serde(default)]
    pub vulnerability_details: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiStatus {
    pub enabled: bool,
    #[serde(default)]
    pub service_initialized: bool,
    #[serde(default)]
    pub types_loaded: u32,
}
