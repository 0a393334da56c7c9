use tracing::debug;

pub mod rda;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle RDA resource files of the Anno games
    #[command(visible_alias = "resource")]
    Rda {
        #[command(subcommand)]
        command: rda::RdaCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Rda { command } => {
                debug!(command = command.name(), "running rda command");
                command.handle()
            }
        }
    }
}
