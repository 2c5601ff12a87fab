// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use client::KeeperClient;
use serde::Serialize;

mod cli;
mod client;
mod logging;
mod session;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose)?;

    if let Commands::Version = args.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let session_path = args
        .session_file
        .clone()
        .unwrap_or_else(session::default_path);
    let stored = session::load(&session_path)?;
    let client = KeeperClient::new(&args.server, &stored)?;

    let outcome = dispatch(&client, args.command).await;

    // Persist whatever the server handed out, even when the command failed
    // after a silent renewal.
    let current = client.session();
    if current != stored {
        session::store(&session_path, &current)?;
    }
    outcome
}

async fn dispatch(client: &KeeperClient, command: Commands) -> Result<()> {
    match command {
        Commands::Register(creds) => print(&client.register(&creds.login, &creds.password).await?),
        Commands::Login(creds) => print(&client.login(&creds.login, &creds.password).await?),
        Commands::Logout => client.logout().await,
        Commands::Whoami => print(&client.me().await?),
        Commands::List { kind } => print(&client.list(kind.map(Into::into)).await?),
        Commands::Add(record) => print(&client.create(&record.into()).await?),
        Commands::Show { id } => print(&client.read(id).await?),
        Commands::Update { id, record } => print(&client.update(id, &record.into()).await?),
        Commands::Delete { id } => client.delete(id).await,
        Commands::Version => Ok(()),
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
