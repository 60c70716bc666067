use expense_core::{
    config::ProxyConfig,
    init,
    proxy::{self, AppState},
};

#[tokio::main]
async fn main() {
    init();

    let config = ProxyConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let app = proxy::router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Error: failed to bind {bind_addr}: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %bind_addr, "expense proxy listening");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
