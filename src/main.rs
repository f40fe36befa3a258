//! Sentence Embedding Server Main
//!
//! Entry point: load config, load the model once, serve HTTP forever

use std::sync::Arc;

use sentence_embedder::{model, start_http_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (optional config.toml, defaults otherwise)
    let config = ServerConfig::from_file_or_default("config.toml")?;

    // Initialize tracing
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        match config.monitoring.log_level.to_lowercase().as_str() {
            "trace" => "sentence_embedder=trace,trace".to_string(),
            "debug" => "sentence_embedder=debug,debug".to_string(),
            "info" => "sentence_embedder=info,info".to_string(),
            "warn" => "sentence_embedder=warn,warn".to_string(),
            "error" => "sentence_embedder=error,error".to_string(),
            _ => "sentence_embedder=info,info".to_string(),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .init();

    println!("🚀 Sentence Embedding Server");
    println!("📊 Log Level: {}", config.monitoring.log_level);
    println!("===============================");

    // Load the model ONCE at startup - failure here is fatal
    let encoder = model::load_model(&config.model)?;

    println!(
        "✅ Model loaded: {} ({} dimensions)",
        encoder.info().identifier,
        encoder.dimension()
    );
    println!(
        "📡 Server running on http://{}, using model: {}",
        config.network.bind_address,
        encoder.info().identifier
    );
    println!("🛑 Press Ctrl+C to stop");

    // Serve until the process is killed
    start_http_server(Arc::new(config), encoder).await?;

    Ok(())
}
