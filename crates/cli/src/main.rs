use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use server::config::{StagecraftConfig, CONFIG_FILE};
use server::{create_router, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stagecraft")]
#[command(about = "Stage execution and deliverable publishing service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Write a default config file
    Init,
    /// Print the blocks a markdown file would be published as
    Preview {
        file: PathBuf,

        /// Print Notion's native block schema instead of the internal model
        #[arg(long)]
        notion: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => init_config(&cli.config).await,
        Some(Commands::Preview { file, notion: native_schema }) => preview(&file, native_schema).await,
        Some(Commands::Serve) | None => serve(&cli.config, cli.port).await,
    }
}

async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    StagecraftConfig::default()
        .write(path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    println!();
    println!("Set credentials in the file or through the environment:");
    println!("  OPENROUTER_API_KEY      required for stage execution");
    println!("  NOTION_API_KEY          with NOTION_PARENT_PAGE_ID, publishes deliverables");
    println!("  GITHUB_TOKEN            creates repositories for codebase stages");
    println!("  DASHBOARD_URL           records repository and deliverable links");

    Ok(())
}

async fn preview(file: &Path, native_schema: bool) -> Result<()> {
    let markdown = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let blocks = document::markdown_to_blocks(&markdown);
    let output = if native_schema {
        serde_json::to_string_pretty(&notion::types::to_notion_blocks(&blocks))?
    } else {
        serde_json::to_string_pretty(&blocks)?
    };

    println!("{}", output);
    Ok(())
}

async fn serve(config_path: &Path, port: Option<u16>) -> Result<()> {
    init_tracing();

    let config = StagecraftConfig::read(config_path).await.with_env();
    let port = port.unwrap_or(config.server.port);

    let state = AppState::from_config(&config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);
    println!();
    println!("Stagecraft");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stagecraft=info,server=info,orchestrator=info,tower_http=info".into()
            }),
        )
        .init();
}
