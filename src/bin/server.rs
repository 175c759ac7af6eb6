use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pokercoach::content::ContentCatalog;
use pokercoach::feedback::{CannedFeedback, FeedbackProvider, GeminiFeedback};
use pokercoach::progress::InMemoryProgressStore;
use pokercoach::server::create_router;
use pokercoach::submission::CoachContext;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let _base = pokercoach::env_config::init_base_path();
    let port = pokercoach::env_config::server_port();
    println!("Starting pokercoach API server...");

    let catalog = match ContentCatalog::load(std::path::Path::new("data")) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Invalid content catalog: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Loaded {} scenarios and {} lessons",
        catalog.scenarios().len(),
        catalog.lesson_count()
    );

    let feedback: Arc<dyn FeedbackProvider> = match pokercoach::env_config::gemini_api_key() {
        Some(key) => {
            println!("GEMINI_API_KEY found — AI feedback enabled");
            Arc::new(GeminiFeedback::new(key))
        }
        None => {
            println!("GEMINI_API_KEY not set — falling back to canned feedback");
            Arc::new(CannedFeedback)
        }
    };

    let store = Arc::new(InMemoryProgressStore::with_snapshot(
        pokercoach::env_config::progress_file(),
    ));

    let ctx = Arc::new(CoachContext::new(
        catalog,
        store,
        feedback,
        pokercoach::env_config::feedback_timeout(),
    ));
    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();
    println!("Server is running on port {}. Press Ctrl+C to stop.", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("\nStopping server...");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
