#[deny(clippy::all)]
use dotenv::dotenv;
use extract::{extract_api, upstream::UpstreamConfig};
use health::health_checks;
use poem::{
    listener::TcpListener, middleware::Tracing, Endpoint, EndpointExt, Route, Server,
};
use poem_openapi::OpenApiService;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod extract;
mod health;
mod utils;

fn app(upstream: UpstreamConfig, hostname: &str) -> impl Endpoint {
    let api_service = OpenApiService::new(extract_api(upstream), "Share Extract", "1.0")
        .server(format!("{}/api", hostname));
    let ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint_yaml();

    let health_service = OpenApiService::new(health_checks(), "Share Extract Health", "1.0")
        .server(format!("{}/health", hostname));

    Route::new()
        .nest("/api", api_service.with(utils::PostOnly))
        .nest("/health", health_service)
        .nest("/swagger", ui)
        .nest("/swagger/spec", spec)
        .with(Tracing)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok(); // This line loads the environment variables from the ".env" file.
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("RUST_LOG"))
        .init();

    let upstream = UpstreamConfig::from_env()?;
    let hostname = utils::get_host();
    let port = utils::get_port();

    info!(
        endpoint = %upstream.endpoint,
        token = upstream.token.is_some(),
        placement = ?upstream.token_placement,
        "Using upstream extractor"
    );

    Server::new(TcpListener::bind(format!("0.0.0.0:{}", port)))
        .run_with_graceful_shutdown(
            app(upstream, &hostname),
            async move {
                let _ = tokio::signal::ctrl_c().await;
            },
            Some(Duration::from_secs(5)),
        )
        .await?;

    Ok(())
}
