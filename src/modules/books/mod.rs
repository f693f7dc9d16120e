pub mod forms;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_db::Database;
use bookshelf_kernel::{InitCtx, Migration, Module};

use handlers::SharedRepository;
use repository::{BookRepository, SqliteBookRepository, CREATE_BOOK_TABLE};

/// The bookshelf pages, served at the root of the site
pub struct BooksModule {
    repo: SharedRepository,
}

impl BooksModule {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn base_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %ctx.settings.database.path.display(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::list_books))
            .route(
                "/add",
                get(handlers::new_book_form).post(handlers::create_book),
            )
            .route(
                "/edit/{id}",
                get(handlers::edit_rating_form).post(handlers::update_rating),
            )
            .route("/delete/{id}", get(handlers::delete_book))
            .with_state(self.repo.clone())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: CREATE_BOOK_TABLE,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.repo.list_all().await?;
        tracing::info!(module = self.name(), books = books.len(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by SQLite
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(SqliteBookRepository::new(db))))
}
