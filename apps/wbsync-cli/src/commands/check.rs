//! Check command - Verify API connectivity and credentials

use clap::Args;
use wbsync_monday::client::{HealthCheckResult, MondayClient};
use wbsync_monday::config::MondayConfig;

use crate::error::{CliError, CliResult};
use crate::output::{print_key_value, print_success};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the check command
pub async fn execute(args: CheckArgs) -> CliResult<()> {
    let config = MondayConfig::from_env()?;
    let result = check(&config).await?;
    print_result(&config, &result, args.json)?;

    if result.healthy {
        Ok(())
    } else {
        Err(CliError::Network(
            result
                .error
                .unwrap_or_else(|| "health check failed".to_string()),
        ))
    }
}

/// Run the health check against the configured endpoint.
pub async fn check(config: &MondayConfig) -> CliResult<HealthCheckResult> {
    let client = MondayClient::new(config)?;
    let result = client.health_check().await;
    tracing::debug!(
        endpoint = %config.endpoint,
        healthy = result.healthy,
        "Health check completed"
    );
    Ok(result)
}

fn print_result(config: &MondayConfig, result: &HealthCheckResult, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    print_key_value("Endpoint", &config.endpoint);
    if let Some(version) = &config.api_version {
        print_key_value("API version", version);
    }
    print_key_value("Checked at", &result.checked_at.to_rfc3339());
    if let Some(user) = &result.user {
        print_key_value("Account", &format!("{} ({})", user.name, user.id));
    }
    if result.healthy {
        print_success("API reachable and token accepted.");
    }
    Ok(())
}
