use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, load_settings_from},
    pagination::showing_range,
    BuilderClient, Roster, SearchController, SearchEvent, SearchSnapshot, SortKey,
};
use shared::domain::{CategoryTag, PokedexId, Stat, TeamId};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "teambuilder", about = "Search the catalog and manage teams")]
struct Cli {
    /// Settings file; defaults to ./teambuilder.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filtered, sorted, paginated catalog search.
    Search {
        #[arg(long)]
        q: Option<String>,
        #[arg(long = "type")]
        types: Vec<CategoryTag>,
        /// Minimum stat, e.g. `--min attack=100`.
        #[arg(long = "min", value_parser = parse_minimum)]
        minimums: Vec<(Stat, String)>,
        #[arg(long)]
        exclude_banned: bool,
        /// Sort key; repeat a key to flip its direction.
        #[arg(long = "sort")]
        sorts: Vec<SortKey>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Items {
        #[arg(long)]
        q: String,
    },
    Abilities {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        q: Option<String>,
    },
    Moves {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        q: Option<String>,
    },
    Recommend {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u32>,
    },
    Analyze {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u32>,
    },
    Vulnerability {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u32>,
    },
    AiStatus,
    #[command(subcommand)]
    Teams(TeamsCommand),
}

#[derive(Subcommand, Debug)]
enum TeamsCommand {
    List {
        #[arg(long)]
        user: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    Save {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "ou")]
        format: String,
        /// Overwrite an existing team instead of creating one.
        #[arg(long)]
        team_id: Option<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u32>,
    },
}

fn parse_minimum(raw: &str) -> Result<(Stat, String), String> {
    let (stat, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected STAT=VALUE, got '{raw}'"))?;
    let stat = stat.parse::<Stat>().map_err(|err| err.to_string())?;
    Ok((stat, value.to_string()))
}

fn pokedex_ids(ids: &[u32]) -> Vec<PokedexId> {
    ids.iter().copied().map(PokedexId).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    let client = BuilderClient::from_settings(&settings)
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    info!(server_url = client.server_url(), "team builder client ready");

    match cli.command {
        Command::Search {
            q,
            types,
            minimums,
            exclude_banned,
            sorts,
            page,
        } => {
            let mut search = SearchController::new(Arc::new(client), settings.search_options());
            let mut events = search.subscribe_events();

            if let Some(q) = q {
                search.set_text_query(&q);
            }
            for tag in types {
                search.toggle_type_filter(tag);
            }
            for (stat, value) in minimums {
                search.set_minimum_stat(stat, &value);
            }
            if exclude_banned {
                search.set_exclude_restricted(true);
            }
            for key in sorts {
                search.set_sort(key);
            }

            let token = search.refresh();
            let mut snapshot = wait_for_results(&mut events, token).await?;
            if page > 1 && !snapshot.is_failure() {
                let token = search.set_page(page);
                snapshot = wait_for_results(&mut events, token).await?;
            }
            print_search(&snapshot);
        }
        Command::Items { q } => {
            for item in client.search_items(&q).await? {
                let category = item.category.as_deref().unwrap_or("-");
                println!("{:<24} {category}", item.name);
            }
        }
        Command::Abilities { id, q } => {
            for ability in client.abilities(PokedexId(id), q.as_deref()).await? {
                let hidden = if ability.is_hidden { " (hidden)" } else { "" };
                println!("{}{hidden}", ability.name);
            }
        }
        Command::Moves { id, q } => {
            for option in client.moves(PokedexId(id), q.as_deref()).await? {
                let method = option.learn_method.as_deref().unwrap_or("-");
                println!("{:<24} {method}", option.name);
            }
        }
        Command::Recommend { ids } => {
            let response = client.recommend(&pokedex_ids(&ids)).await?;
            for (rank, rec) in response.recommendations.iter().enumerate() {
                println!(
                    "{:>2}. #{:<4} {:<16} {:.2}  {}",
                    rank + 1,
                    rec.pokedex_id.0,
                    rec.name,
                    rec.score,
                    join_tags(&rec.types)
                );
                for reason in &rec.reasoning {
                    println!("      + {reason}");
                }
                for warning in &rec.warnings {
                    println!("      ! {warning}");
                }
            }
        }
        Command::Analyze { ids } => {
            let response = client.analyze(&pokedex_ids(&ids)).await?;
            if let Some(weakness) = response.major_weakness() {
                println!("major weakness: {weakness}");
            }
            println!("{}", serde_json::to_string_pretty(&response.analysis)?);
        }
        Command::Vulnerability { ids } => {
            let report = client.team_vulnerability(&pokedex_ids(&ids)).await?;
            println!(
                "most vulnerable to {} (x{:.1}){}",
                report.most_vulnerable_type,
                report.max_multiplier,
                if report.is_balanced { ", balanced" } else { "" }
            );
        }
        Command::AiStatus => {
            let status = client.ai_status().await?;
            println!(
                "enabled={} initialized={} types_loaded={}",
                status.enabled, status.service_initialized, status.types_loaded
            );
        }
        Command::Teams(command) => run_teams(&client, command).await?,
    }

    Ok(())
}

async fn run_teams(client: &BuilderClient, command: TeamsCommand) -> Result<()> {
    match command {
        TeamsCommand::List { user } => {
            for team in client.list_user_teams(&user).await? {
                let updated = team
                    .updated_at
                    .or(team.created_at)
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{:<12} {:<24} {:<8} {} members  {updated}",
                    team.id.0,
                    team.team_name,
                    team.format.as_deref().unwrap_or("-"),
                    team.team_members.len()
                );
            }
        }
        TeamsCommand::Delete { id } => {
            let response = client.delete_team(&TeamId(id)).await?;
            println!("{}", response.message);
        }
        TeamsCommand::Save {
            name,
            description,
            format,
            team_id,
            ids,
        } => {
            let mut roster = Roster::new();
            for id in pokedex_ids(&ids) {
                let details = client.pokemon_details(id).await?;
                roster.add(details.to_entity())?;
            }
            println!(
                "team power {}, dominant type {}",
                roster.team_power(),
                roster
                    .dominant_type()
                    .map(|tag| tag.to_string())
                    .unwrap_or_else(|| "-".into())
            );
            let payload =
                roster.to_team_payload(&name, description.as_deref(), &format, team_id.map(TeamId))?;
            let saved = client.save_team(&payload).await?;
            println!("saved {} as {}", saved.team_name, saved.team_id);
        }
    }
    Ok(())
}

async fn wait_for_results(
    events: &mut broadcast::Receiver<SearchEvent>,
    token: u64,
) -> Result<SearchSnapshot> {
    loop {
        match events.recv().await {
            Ok(SearchEvent::ResultsApplied(snapshot)) if snapshot.token == token => {
                return Ok(snapshot)
            }
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => bail!("search session ended before results arrived"),
        }
    }
}

fn join_tags(tags: &[CategoryTag]) -> String {
    tags.iter()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn print_search(snapshot: &SearchSnapshot) {
    if let Some(failure) = &snapshot.failure {
        eprintln!("search failed: {failure}");
    }
    if snapshot.page.items.is_empty() {
        println!("no results");
        return;
    }

    for entity in &snapshot.page.items {
        let stats = entity.stats_or_default();
        println!(
            "#{:<4} {:<16} {:<16} BST {:>3}{}",
            entity.pokedex_id.0,
            entity.name,
            join_tags(&entity.types),
            stats.total(),
            if entity.is_banned { "  [banned]" } else { "" }
        );
    }

    let state = &snapshot.state;
    if let Some((first, last)) = showing_range(
        state.page(),
        state.page_size(),
        snapshot.page.items.len(),
        snapshot.page.total_count,
    ) {
        println!(
            "showing {first}-{last} of {}, sorted by {} {}",
            snapshot.page.total_count,
            state.sort_key(),
            if state.sort_ascending() { "asc" } else { "desc" }
        );
    }
    if let Some(view) = &snapshot.pagination {
        let pages: Vec<String> = view
            .pages
            .clone()
            .map(|n| {
                if n == view.current {
                    format!("[{n}]")
                } else {
                    n.to_string()
                }
            })
            .collect();
        println!(
            "{} {} {} of {}",
            if view.previous_enabled { "<" } else { " " },
            pages.join(" "),
            if view.next_enabled { ">" } else { " " },
            view.total_pages
        );
    }
}
