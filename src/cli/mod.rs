pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pixelkit")]
#[command(about = "PixelKit operator CLI - admin role management")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Admin role provisioning and inspection")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Admin { cmd } => commands::admin::handle(cmd).await,
    }
}
