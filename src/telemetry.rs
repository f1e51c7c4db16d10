use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::AppError;

pub const BOT_COMMANDS: &str = "finanza_bot_commands_total";
pub const WEBHOOK_UPDATES: &str = "finanza_webhook_updates_total";

/// Installs the global Prometheus recorder. Call once, from `serve` only.
pub fn install() -> Result<PrometheusHandle, AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Server(format!("failed to install metrics recorder: {}", e)))?;

    describe_counter!(BOT_COMMANDS, "Chat commands executed, by command");
    describe_counter!(WEBHOOK_UPDATES, "Webhook updates received, by outcome");

    Ok(handle)
}
