use anyhow::Context;
use clap::{Parser, Subcommand};
use lobby_api::{build_router, AppState};
use lobby_config::load as load_config;
use lobby_database::{MessageRepository, ParticipantRepository};
use lobby_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "lobby-server")]
#[command(about = "Lobby chat backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the presence sweeper
    Serve,
    /// Print participants and messages stored in the database
    DumpData,
    /// Delete all participants and messages from the database
    ClearData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpData => dump_data().await,
        Commands::ClearData => clear_data().await,
    }
}

async fn initialise() -> anyhow::Result<(lobby_config::AppConfig, BackendServices)> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    Ok((config, services))
}

async fn run_server() -> anyhow::Result<()> {
    let (config, services) = initialise().await?;

    info!("starting Lobby backend");

    let sweeper = services.spawn_sweeper();
    let app = build_router(AppState::new(services.room.clone()));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(lobby_runtime::shutdown_signal())
        .await
        .context("http server error");

    sweeper.shutdown().await;
    services.db_pool.close().await;

    served?;
    info!("backend shut down");
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    let (_, services) = initialise().await?;

    info!("dumping participants and messages from database");

    let participants = ParticipantRepository::new(services.db_pool.clone())
        .list()
        .await
        .context("failed to fetch participants")?;

    println!("=== PARTICIPANTS ===");
    if participants.is_empty() {
        println!("No participants found in database");
    } else {
        println!("Found {} participants:", participants.len());
        println!("{:<30} {:<30}", "Name", "Last Seen");
        println!("{}", "-".repeat(60));

        for participant in participants {
            println!(
                "{:<30} {:<30}",
                participant.name,
                participant.last_seen.to_rfc3339()
            );
        }
    }

    let messages = MessageRepository::new(services.db_pool.clone())
        .list_all()
        .await
        .context("failed to fetch messages")?;

    println!("\n=== MESSAGES ===");
    if messages.is_empty() {
        println!("No messages found in database");
    } else {
        println!("Found {} messages:", messages.len());
        println!(
            "{:<6} {:<20} {:<20} {:<16} {:<10} {:<40}",
            "ID", "From", "To", "Type", "Time", "Text"
        );
        println!("{}", "-".repeat(115));

        for message in messages {
            let text: String = message.text.chars().take(40).collect();
            println!(
                "{:<6} {:<20} {:<20} {:<16} {:<10} {:<40}",
                message.id,
                message.from,
                message.to,
                message.kind.as_str(),
                message.time,
                text
            );
        }
    }

    Ok(())
}

async fn clear_data() -> anyhow::Result<()> {
    let (_, services) = initialise().await?;

    info!("clearing participants and messages from database");

    let messages_deleted = MessageRepository::new(services.db_pool.clone())
        .clear()
        .await
        .context("failed to clear messages")?;
    let participants_deleted = ParticipantRepository::new(services.db_pool.clone())
        .clear()
        .await
        .context("failed to clear participants")?;

    println!("Database cleared:");
    println!("- {messages_deleted} messages deleted");
    println!("- {participants_deleted} participants deleted");

    Ok(())
}
