use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use hawkeye_server::build_app;
use hawkeye_server::config::ServerConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("HAWKEYE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves on Ctrl-C or once `token` is cancelled; either way the token ends
/// up cancelled so SSE streams and background tasks wind down.
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutdown signal received");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ServerConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let (app, state) = build_app(config);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %listen_addr, "Failed to bind: {e}");
            std::process::exit(1);
        },
    };
    tracing::info!(addr = %listen_addr, "Hawk-Eye server listening");

    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()));
    if let Err(e) = serve.await {
        tracing::error!("Server error: {e}");
    }

    hawkeye_server::shutdown(&state).await;
}
