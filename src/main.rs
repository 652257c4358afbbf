//! Sprout - a gamified self-help companion

use sprout::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Rustls 0.23+ needs a process-wide crypto provider for HTTPS
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        tracing::debug!("Rustls crypto provider already installed");
    }

    // WARN level by default, use RUST_LOG=info for more
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    cli::run().await
}
