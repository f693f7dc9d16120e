//! Application bootstrap: database, module registry, and lifecycle.

use anyhow::Context;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A booted application: schema in place, modules initialized and started.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Open the configured database and boot every module against it.
    pub async fn boot(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::open(&settings.database.path)
            .await
            .with_context(|| {
                format!(
                    "failed to open database {}",
                    settings.database.path.display()
                )
            })?;
        Self::with_database(settings, db).await
    }

    /// Boot against an already opened database.
    pub async fn with_database(settings: Settings, db: Database) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;

        let applied = db
            .apply_migrations(registry.collect_migrations())
            .await
            .context("failed to create database schema")?;
        tracing::info!(migrations = applied, "database schema ready");

        registry.start_modules(&ctx).await?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The full HTTP router, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Serve HTTP until Ctrl-C, then stop modules and close the database.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;
        self.shutdown().await?;
        served
    }

    /// Stop modules in reverse order and release the database.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_modules().await?;
        self.db.close().await.context("failed to close database")?;
        Ok(())
    }
}
