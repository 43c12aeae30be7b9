//! Demo binary: hello-world and login routes.

use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rin::{Engine, StatusCode};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(addr))
}

async fn async_main(addr: String) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut app = Engine::new();

    app.get("/", |c| {
        c.json(StatusCode::OK, &json!({"message": "Hello, World!"}));
    });

    app.post("/login", |c| {
        let username = c.post_form("username").unwrap_or_default().to_string();
        let password = c.post_form("password").unwrap_or_default().to_string();
        c.json(
            StatusCode::OK,
            &json!({
                "username": username,
                "password": password,
            }),
        );
    });

    info!("starting rin {} demo", rin::PKG_VERSION);
    app.run(&addr).await?;
    Ok(())
}
