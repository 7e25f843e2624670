use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use candychat::chat::Orchestrator;
use candychat::cli::{
    commands::{Cli, Commands},
    run_cli,
};
use candychat::config::AppConfig;
use candychat::db::{self, MessageStore};
use candychat::llm::ProviderFactory;
use clap::Parser;
use tracing::{error, info};

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        run_cli(cli.command, cli.config).await;
        return Ok(());
    }

    info!("Starting CandyChat server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let llm_provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("Failed to initialize LLM provider from config");
            std::process::exit(1);
        }
    };

    info!("Completion provider: {}", llm_provider.name());

    let orchestrator = web::Data::new(Orchestrator::new(
        MessageStore::new(db_pool),
        llm_provider,
        &config.chat,
    ));

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(orchestrator.clone())
            .route("/health", web::get().to(health))
            .configure(candychat::api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
