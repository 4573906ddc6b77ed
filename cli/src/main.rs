//! ArchLens CLI — explore an architecture knowledge graph from the terminal
//!
//! Talks to a running analysis backend over HTTP and drives the same
//! normalization, filtering, and navigation paths the graph view uses.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};

use archlens::api::{ArchlensApi, RemoteClient};
use archlens::entity::{EntityKind, NewRepository};
use archlens::graph::RenderModel;
use archlens::render::{ForceLayout, LayoutSurface};
use archlens::view::{
    bundle_sections, EntityDetailResolver, FilterCriteria, FilterEngine, GroupKey,
    InteractionController, ListView, ModalState, OverviewCounts, Tab, TabRecord, ViewContext,
};
use archlens::ExplorerConfig;

#[derive(Parser)]
#[command(name = "archlens", version, about = "ArchLens knowledge-graph explorer CLI")]
struct Cli {
    /// Backend HTTP URL (falls back to the config file, then the default)
    #[arg(long, global = true, env = "ARCHLENS_URL")]
    url: Option<String>,

    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive substring over name, file path, and ARN
    #[arg(long)]
    search: Option<String>,

    /// Exact match on the declared type field
    #[arg(long = "type")]
    type_filter: Option<String>,

    /// Exact match on the categorical field (language, provider, package manager)
    #[arg(long)]
    category: Option<String>,

    /// Keep entities with at least one vulnerability of this severity
    #[arg(long)]
    severity: Option<String>,

    /// Group results
    #[arg(long, value_enum)]
    group_by: Option<GroupByArg>,

    /// Show every row even past the display threshold
    #[arg(long)]
    all: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum GroupByArg {
    Type,
    Category,
    Directory,
    Severity,
}

impl From<GroupByArg> for GroupKey {
    fn from(arg: GroupByArg) -> GroupKey {
        match arg {
            GroupByArg::Type => GroupKey::Type,
            GroupByArg::Category => GroupKey::Category,
            GroupByArg::Directory => GroupKey::Directory,
            GroupByArg::Severity => GroupKey::Severity,
        }
    }
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone(),
            type_filter: self.type_filter.clone(),
            category: self.category.clone(),
            severity: self.severity.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List registered repositories
    Repos,
    /// Show one repository with its overview counts
    Show { repo: String },
    /// Register a repository
    Add {
        url: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "main")]
        branch: String,
    },
    /// Trigger backend analysis and print the summary counts
    Analyze { repo: String },
    /// Inspect the knowledge graph
    Graph {
        repo: String,
        /// Print per-type statistics instead of the model summary
        #[arg(long)]
        stats: bool,
        /// Run the force layout to rest and print node positions
        #[arg(long)]
        layout: bool,
    },
    /// List dependencies
    Deps {
        repo: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List detected services
    Services {
        repo: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List code elements
    Code {
        repo: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List security entities
    Security {
        repo: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one entity's full detail bundle
    Detail {
        repo: String,
        kind: EntityKind,
        entity_id: String,
    },
    /// Select a graph node by name and navigate to its tab entry
    Node { repo: String, name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ExplorerConfig::load(cli.config.as_deref());
    let base_url = cli.url.clone().unwrap_or_else(|| config.base_url.clone());
    let client = RemoteClient::with_timeout(&base_url, config.request_timeout_secs);

    match cli.command {
        Commands::Repos => repos(&client, &cli.format).await,
        Commands::Show { repo } => show(&client, &repo).await,
        Commands::Add { url, name, branch } => add(&client, url, name, branch).await,
        Commands::Analyze { repo } => analyze(&client, &repo).await,
        Commands::Graph { repo, stats, layout } => graph(&client, &repo, stats, layout).await,
        Commands::Deps { repo, filter } => deps(&client, &repo, &filter, &cli.format).await,
        Commands::Services { repo, filter } => services(&client, &repo, &filter, &cli.format).await,
        Commands::Code { repo, filter } => code(&client, &repo, &filter, &cli.format).await,
        Commands::Security { repo, filter } => security(&client, &repo, &filter, &cli.format).await,
        Commands::Detail { repo, kind, entity_id } => detail(&client, &repo, kind, &entity_id).await,
        Commands::Node { repo, name } => node(&client, &repo, &name).await,
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.to_vec());
    table
}

async fn repos(client: &RemoteClient, format: &OutputFormat) -> anyhow::Result<()> {
    let repos = client.repositories().await?;
    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&repos)?);
        return Ok(());
    }

    let mut table = new_table(&["id", "name", "url", "branch", "last analyzed"]);
    for repo in &repos {
        table.add_row(vec![
            repo.id.clone(),
            repo.name.clone(),
            repo.url.clone(),
            repo.branch.clone(),
            repo.last_analyzed_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn show(client: &RemoteClient, repo_id: &str) -> anyhow::Result<()> {
    let repo = client.repository(repo_id).await?;
    let counts = OverviewCounts::load(client, repo_id).await;

    println!("{} ({})", repo.name, repo.url);
    println!("branch: {}", repo.branch);
    match repo.last_analyzed_at {
        Some(t) => println!("analyzed: {}", t.to_rfc3339()),
        None => println!("analyzed: never"),
    }
    println!();
    println!("dependencies:      {}", counts.dependencies);
    println!("services:          {}", counts.services);
    println!("code elements:     {}", counts.code_elements);
    println!("security entities: {}", counts.security_entities);
    Ok(())
}

async fn add(
    client: &RemoteClient,
    url: String,
    name: Option<String>,
    branch: String,
) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(|| {
        url.trim_end_matches(".git")
            .rsplit('/')
            .next()
            .unwrap_or("repository")
            .to_string()
    });
    let created = client
        .create_repository(&NewRepository { name, url, branch })
        .await?;
    println!("registered {} ({})", created.name, created.id);
    Ok(())
}

async fn analyze(client: &RemoteClient, repo_id: &str) -> anyhow::Result<()> {
    let summary = client.analyze(repo_id).await.context("analysis failed")?;
    println!("dependencies:      {}", summary.total_dependencies);
    println!("services:          {}", summary.services_found);
    println!("code elements:     {}", summary.code_elements_found);
    println!("security entities: {}", summary.security_entities_found);
    Ok(())
}

async fn graph(client: &RemoteClient, repo_id: &str, stats: bool, layout: bool) -> anyhow::Result<()> {
    let payload = client.graph(repo_id).await?;
    let model = RenderModel::build(&payload);

    if stats {
        let statistics = model.statistics();
        let mut table = new_table(&["node type", "count"]);
        for (node_type, count) in &statistics.nodes_by_type {
            table.add_row(vec![node_type.clone(), count.to_string()]);
        }
        println!("{table}");

        let mut table = new_table(&["edge type", "count"]);
        for (kind, count) in &statistics.edges_by_kind {
            table.add_row(vec![kind.clone(), count.to_string()]);
        }
        println!("{table}");

        let mut table = new_table(&["most connected", "edges"]);
        for (name, count) in &statistics.most_connected {
            table.add_row(vec![name.clone(), count.to_string()]);
        }
        println!("{table}");
        return Ok(());
    }

    if layout {
        let mut surface = ForceLayout::new(1280.0, 720.0);
        surface.load(&model);
        for _ in 0..3000 {
            surface.tick(1.0 / 60.0);
            if surface.is_stable() {
                break;
            }
        }

        let mut table = new_table(&["node", "type", "x", "y"]);
        for placed in surface.placed_nodes() {
            let node_type = model
                .node(&placed.id)
                .map(|n| n.node_type.display_label())
                .unwrap_or("?");
            table.add_row(vec![
                placed.label.replace('\n', " "),
                node_type.to_string(),
                format!("{:.0}", placed.x),
                format!("{:.0}", placed.y),
            ]);
        }
        println!("{table}");
        return Ok(());
    }

    println!("{} nodes, {} edges", model.nodes.len(), model.edges.len());
    if model.dropped_edges > 0 {
        println!("{} edges dropped (missing endpoints)", model.dropped_edges);
    }
    Ok(())
}

/// Print a filtered tab list, honoring grouping and the display threshold
fn print_tab<T: TabRecord + serde::Serialize>(
    engine: &FilterEngine,
    rows: Vec<&T>,
    args: &FilterArgs,
    format: &OutputFormat,
    describe: impl Fn(&T) -> Vec<String>,
    headers: &[&str],
) {
    if matches!(format, OutputFormat::Json) {
        match serde_json::to_string_pretty(&rows) {
            Ok(body) => println!("{body}"),
            Err(e) => eprintln!("serialization failed: {e}"),
        }
        return;
    }

    if let Some(group_by) = args.group_by {
        let groups = engine.group(rows, group_by.into());
        for (label, members) in groups {
            println!("\n{} ({})", label, members.len());
            let mut table = new_table(headers);
            for member in members {
                table.add_row(describe(member));
            }
            println!("{table}");
        }
        return;
    }

    let mut view = ListView::new(rows);
    if args.all {
        view.show_all();
    }
    let mut table = new_table(headers);
    for row in view.visible() {
        table.add_row(describe(row));
    }
    println!("{table}");
    if view.is_collapsed() {
        println!(
            "{} of {} shown; rerun with --all to show every row",
            view.visible().len(),
            view.total()
        );
    }
}

async fn deps(
    client: &RemoteClient,
    repo_id: &str,
    args: &FilterArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut engine = FilterEngine::new();
    engine.activate_tab(client, repo_id, Tab::Dependencies).await?;
    let rows = engine.filter(&engine.dependencies, &args.criteria());
    print_tab(
        &engine,
        rows,
        args,
        format,
        |d| {
            vec![
                d.name.clone(),
                d.version.clone(),
                d.package_manager.clone(),
                d.type_field().to_string(),
                d.file_path.clone(),
            ]
        },
        &["name", "version", "package manager", "scope", "file"],
    );
    Ok(())
}

async fn services(
    client: &RemoteClient,
    repo_id: &str,
    args: &FilterArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut engine = FilterEngine::new();
    engine.activate_tab(client, repo_id, Tab::Services).await?;
    let rows = engine.filter(&engine.services, &args.criteria());
    print_tab(
        &engine,
        rows,
        args,
        format,
        |s| {
            vec![
                s.name.clone(),
                s.provider.clone(),
                s.service_type.clone(),
                format!("{:.0}%", s.confidence * 100.0),
                s.file_path.clone(),
            ]
        },
        &["name", "provider", "type", "confidence", "file"],
    );
    Ok(())
}

async fn code(
    client: &RemoteClient,
    repo_id: &str,
    args: &FilterArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut engine = FilterEngine::new();
    engine.activate_tab(client, repo_id, Tab::Code).await?;
    let rows = engine.filter(&engine.code_elements, &args.criteria());
    print_tab(
        &engine,
        rows,
        args,
        format,
        |c| {
            vec![
                c.name.clone(),
                c.element_type.clone(),
                c.language.clone(),
                format!("{}:{}", c.file_path, c.line_number),
            ]
        },
        &["name", "type", "language", "location"],
    );
    Ok(())
}

async fn security(
    client: &RemoteClient,
    repo_id: &str,
    args: &FilterArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut engine = FilterEngine::new();
    engine.activate_tab(client, repo_id, Tab::Security).await?;
    let rows = engine.filter(&engine.security_entities, &args.criteria());
    print_tab(
        &engine,
        rows,
        args,
        format,
        |e| {
            vec![
                e.name.clone(),
                e.entity_type.clone(),
                e.provider.clone().unwrap_or_default(),
                engine
                    .highest_severity(&e.id)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                e.file_path.clone(),
            ]
        },
        &["name", "type", "provider", "severity", "file"],
    );
    Ok(())
}

async fn detail(
    client: &RemoteClient,
    repo_id: &str,
    kind: EntityKind,
    entity_id: &str,
) -> anyhow::Result<()> {
    let mut resolver = EntityDetailResolver::new();
    resolver.open(client, repo_id, kind, entity_id).await?;

    match resolver.modal().state() {
        Some(ModalState::Ready(bundle)) => {
            for section in bundle_sections(bundle) {
                println!("\n{}", section.title);
                for line in &section.lines {
                    println!("  {}", line);
                }
            }
        }
        Some(ModalState::NotFound(message)) => println!("not found: {}", message),
        Some(ModalState::Failed(message)) => println!("failed: {}", message),
        _ => {}
    }
    Ok(())
}

async fn node(client: &RemoteClient, repo_id: &str, name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("node name is required");
    }

    let payload = client.graph(repo_id).await?;
    let model = RenderModel::build(&payload);

    let needle = name.to_lowercase();
    let Some(hit) = model
        .nodes
        .iter()
        .find(|n| n.name.to_lowercase().contains(&needle))
    else {
        println!("no node matching \"{}\"", name);
        return Ok(());
    };

    let mut controller = InteractionController::new();
    let hit_id = hit.id.clone();
    let Some(summary) = controller.select(&model, &hit_id).cloned() else {
        println!("no node matching \"{}\"", name);
        return Ok(());
    };

    println!("{} ({})", summary.name, summary.type_label);
    for (key, value) in &summary.properties {
        println!("  {}: {}", key, value);
    }
    if !summary.connections.is_empty() {
        println!("connections:");
        for conn in &summary.connections {
            println!("  {} {} ({})", conn.direction.symbol(), conn.other, conn.label);
        }
    }

    let mut ctx = ViewContext::new();
    ctx.open_repository(repo_id);
    let mut engine = FilterEngine::new();
    let matched = controller
        .navigate(client, &mut ctx, &mut engine, Instant::now())
        .await?;

    match matched {
        Some(entry) => println!("\n{} tab: highlighted \"{}\"", ctx.active_tab, entry),
        None => println!("\n{} tab activated", ctx.active_tab),
    }
    Ok(())
}
