use echo_bot::classifier::Classifier;
use echo_bot::cli::CliChannel;
use echo_bot::config::BotConfig;
use echo_bot::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if std::env::args().skip(1).any(|arg| arg == "--cli") {
        eprintln!("🤖 Echo Bot v{} (CLI)", env!("CARGO_PKG_VERSION"));
        eprintln!("   Type a message and press Enter. /quit to exit.\n");
        let mut stdout = tokio::io::stdout();
        CliChannel::stdin().run(&Classifier::new(), &mut stdout).await?;
        return Ok(());
    }

    let config = BotConfig::from_env()?;

    eprintln!("🤖 Echo Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Endpoint: http://{}/api/messages", config.bind_addr());
    eprintln!(
        "   Auth: {}",
        if config.app_id.is_empty() {
            "anonymous (emulator)".to_string()
        } else {
            format!("app id {}", config.app_id)
        }
    );

    let state = AppState::from_config(&config);
    server::serve(&config, state).await?;

    Ok(())
}
