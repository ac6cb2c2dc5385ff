mod args;
mod render;
mod transport;

use anyhow::{bail, Context, Result};
use clap::Parser;
use todo_sync::{TodoClient, TodoSynchronizer, UpdateTodo};
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};
use transport::ReqwestTransport;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let transport = ReqwestTransport::new().context("could not build the HTTP client")?;
    let sync = TodoSynchronizer::new(TodoClient::new(&cli.base_url), transport);
    tracing::debug!(base_url = %cli.base_url, page = cli.page, "starting");

    sync.list_page(cli.page).await;
    if let Some(err) = sync.snapshot().last_error {
        bail!("could not load page {}: {err}", cli.page);
    }

    match cli.command {
        Commands::List => {}
        Commands::Add { title, description } => {
            sync.create_todo(&title, description.as_deref()).await;
        }
        Commands::Toggle { id } => sync.toggle_completed(id).await,
        Commands::Delete { id } => sync.delete_todo(id).await,
        Commands::Edit {
            id,
            title,
            description,
            completed,
        } => {
            let patch = UpdateTodo {
                title,
                description,
                completed,
            };
            if patch == UpdateTodo::default() {
                bail!("nothing to change; pass --title, --description or --completed");
            }
            sync.update_todo(id, patch)
                .await
                .context("could not save the edit")?;
        }
    }

    let mut state = sync.snapshot();
    let error = state.last_error.take();
    println!("{}", render::render(&state, cli.theme));
    if let Some(err) = error {
        bail!(err);
    }
    Ok(())
}
