use anyhow::Context;
use bookshelf_app::App;
use bookshelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path.display(),
        "bookshelf-app bootstrap starting"
    );

    let app = App::boot(settings).await?;

    tracing::info!("bookshelf-app bootstrap complete");
    app.serve().await
}
