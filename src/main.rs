use std::{io, process::ExitCode, sync::Arc};

use clap::Parser;
use finanza::{
    bot::Bot,
    config::{CliArgs, Config, Mode},
    console::Console,
    error::AppError,
    logging, storage,
    telegram::TelegramClient,
    telemetry,
    webhook::{self, WebhookState},
};

fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command.unwrap_or(Mode::Console), config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(mode: Mode, config: Config) -> Result<(), AppError> {
    match mode {
        Mode::Console => run_console(&config),
        Mode::Serve => runtime()?.block_on(serve(config)),
        Mode::SetWebhook { url } => runtime()?.block_on(register_webhook(&config, &url)),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, AppError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

fn run_console(config: &Config) -> Result<(), AppError> {
    let storage = storage::open(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(stdin.lock(), stdout.lock(), storage, config.validation.amount_policy()).run()
}

fn require_token(config: &Config) -> Result<(), AppError> {
    if config.telegram.token.is_empty() {
        return Err(AppError::Config(
            "telegram token is not set (use [telegram] token, --telegram-token or FINANZA_TELEGRAM_TOKEN)".to_string(),
        ));
    }
    Ok(())
}

async fn register_webhook(config: &Config, public_url: &str) -> Result<(), AppError> {
    require_token(config)?;
    TelegramClient::new(&config.telegram).set_webhook(public_url).await?;
    tracing::info!("Webhook registered with Telegram");
    Ok(())
}

async fn serve(config: Config) -> Result<(), AppError> {
    require_token(&config)?;
    let addr = config.listen_addr()?;

    let storage = storage::open(&config);
    let client = Arc::new(TelegramClient::new(&config.telegram));

    if let Some(public_url) = &config.telegram.public_url {
        match client.set_webhook(public_url).await {
            Ok(()) => tracing::info!("Webhook registered with Telegram"),
            Err(e) => tracing::error!("Failed to register webhook: {}", e),
        }
    }

    let bot = Arc::new(Bot::new(storage, config.validation.amount_policy()));
    let state = WebhookState::new(bot, client, &config.telegram.token).with_metrics(telemetry::install()?);
    let app = webhook::create_router(state);

    tracing::info!("API listening on {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(|e| AppError::Server(format!("failed to bind {}: {}", addr, e)))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
