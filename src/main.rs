use clap::Parser;

mod app;
mod auth;
mod cli;
mod config;
mod db;
mod error;
mod products;
mod state;

use crate::{
    cli::{Cli, Command},
    config::{AppConfig, JwtConfig},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // stdout carries only the token here, so logging stays off
    if let Command::IssueToken { subject, ttl_minutes } = cli.command() {
        let token = crate::cli::issue_token(JwtConfig::from_env(), subject, *ttl_minutes)?;
        println!("{token}");
        return Ok(());
    }

    init_tracing();
    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config.clone()).await?;
    let app = app::build_app(app_state);
    app::serve(app, &config).await
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "product_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
