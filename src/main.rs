use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod store;
mod todo;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration before anything else; logging depends on it
    let cfg = config::Config::load()?;
    logger::init(&cfg.logging).map_err(|e| -> Box<dyn std::error::Error> { e })?;

    // Build the Tokio runtime; worker count follows server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // One store client for the whole process
    let store = store::shared(&cfg.store).await?;

    // Bind and share state with every connection
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(config::AppState::new(cfg, store));
    logger::log_server_start(&addr, &state.config);

    // SIGINT/SIGTERM stop the accept loop
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(listener, state, shutdown).await
}
