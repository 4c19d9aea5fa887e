use axum::{routing::post, Router};
use dotenv::dotenv;
use flashpay_gateway::api::{handle_callback, CallbackState};
use flashpay_gateway::cache::{init_cache_pool, MemoryCache, PaymentCache, RedisCache};
use flashpay_gateway::callbacks::CallbackReconciler;
use flashpay_gateway::config::AppConfig;
use flashpay_gateway::gateway::client::{FlashpayClient, GatewayApi};
use flashpay_gateway::logging::init_tracing;
use flashpay_gateway::payment::provider::PaymentStore;
use flashpay_gateway::refund::RefundOrchestrator;
use flashpay_gateway::signature::{HmacSigner, SignatureVerifier};
use flashpay_gateway::store::memory::MemoryOrderStore;
use flashpay_gateway::store::OrderStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);
    if let Err(err) = config.validate() {
        error!("Invalid configuration: {err}");
        std::process::exit(1);
    }

    let cache: Arc<dyn PaymentCache> = if config.cache.enabled {
        match init_cache_pool(&config.cache).await {
            Ok(pool) => Arc::new(RedisCache::new(pool)),
            Err(err) => {
                warn!("Redis unavailable, using the in-memory cache: {err}");
                Arc::new(MemoryCache::new())
            }
        }
    } else {
        info!("Payment cache disabled by configuration");
        Arc::new(MemoryCache::new())
    };

    let signer: Arc<dyn SignatureVerifier> =
        Arc::new(HmacSigner::new(config.gateway.secret_key.clone()));
    let gateway: Arc<dyn GatewayApi> =
        match FlashpayClient::new(config.gateway.clone(), Arc::clone(&signer)) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                error!("Failed to build the gateway client: {err}");
                std::process::exit(1);
            }
        };

    // The in-memory store stands in for the e-commerce platform's
    // persistence until a real adapter is plugged in.
    let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());

    let payments = Arc::new(PaymentStore::new(
        Arc::clone(&gateway),
        cache,
        config.cache.clone(),
    ));
    let refunds = Arc::new(RefundOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&payments),
        Arc::clone(&gateway),
        config.refund.clone(),
        config.gateway.clone(),
    ));
    let reconciler = Arc::new(CallbackReconciler::new(store, payments, refunds));

    let state = Arc::new(CallbackState {
        reconciler,
        verifier: signer,
    });

    let app = Router::new()
        .route("/callbacks", post(handle_callback))
        .with_state(state);

    let addr: SocketAddr = match format!("{}:{}", config.server.host, config.server.port).parse()
    {
        Ok(addr) => addr,
        Err(err) => {
            error!("Invalid server address: {err}");
            std::process::exit(1);
        }
    };

    info!(%addr, "Starting callback listener");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {err}");
    }
}
