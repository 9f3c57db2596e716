use clap::{Parser, Subcommand};
use orrery::config;
use orrery::sys::{client, runtime};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orrery", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Control socket path (overrides the config file)
    #[arg(short = 's', long, global = true)]
    socket: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the carousel daemon (default).
    Run,
    /// Send one command to a running daemon, e.g. `send drag 100`.
    Send {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists and print its path.
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = config::load_or_default();
    if let Some(socket) = cli.socket {
        config.socket = socket;
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => runtime::run(config),
        Commands::Send { words } => {
            if let Some(reply) = client::send_command(&config.socket, &words.join(" "))? {
                println!("{reply}");
            }
            Ok(())
        }
        Commands::Init => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
