use std::sync::Arc;

use mailer::{Dispatcher, PdfRenderer, SmtpTransport};
use migration::{Migrator, MigratorTrait};
use server::{ServerState, TokenKeys};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitmail={level},server={level},engine={level},mailer={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let transport = SmtpTransport::new(&settings.mail.smtp)?;
    tracing::info!(
        "Mail relay {}:{}",
        settings.mail.smtp.host, settings.mail.smtp.port
    );
    let dispatcher = Dispatcher::builder()
        .transport(Arc::new(transport))
        .renderer(Arc::new(PdfRenderer::new(settings.pdf)))
        .sender(settings.mail.from.as_str())
        .build()?;

    if settings.auth.jwt_secret.trim().is_empty() {
        return Err("auth.jwt_secret must not be empty".into());
    }
    let tokens = TokenKeys::new(
        settings.auth.jwt_secret.as_bytes(),
        chrono::Duration::seconds(settings.auth.token_ttl_secs),
    );

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(ServerState::new(engine, dispatcher, tokens), listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("Database ready");
    Ok(database)
}
