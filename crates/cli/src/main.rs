use std::path::PathBuf;

use anyhow::Context;
use bookshelf_app::{
    modules::books::repository::{BookRepository, SqliteBookRepository},
    App,
};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about = "Manage the bookshelf app")]
struct Cli {
    /// SQLite file to use instead of `database.path` from the settings
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server until Ctrl-C
    Serve,
    /// Create the database schema and exit
    Migrate,
    /// Print every book in id order
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    if let Some(path) = cli.database {
        settings.database.path = path;
    }
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::debug!(
        env = ?settings.environment,
        db = %settings.database.path.display(),
        command = ?cli.command,
        "bookshelf CLI starting"
    );

    let app = App::boot(settings).await?;

    match cli.command {
        Command::Serve => app.serve().await,
        Command::Migrate => {
            println!("schema ready at {}", app.settings().database.path.display());
            app.shutdown().await
        }
        Command::List => {
            let repo = SqliteBookRepository::new(app.database().clone());
            let books = repo.list_all().await.context("failed to list books")?;
            for book in &books {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    book.id, book.title, book.author, book.read_year, book.rating
                );
            }
            app.shutdown().await
        }
    }
}
