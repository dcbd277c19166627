use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playferry::{cli, config, error, types::SearchKind, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with YouTube Music and store the credentials
    Auth(AuthOptions),

    /// List Spotify playlists
    Playlists,

    /// Transfer Spotify playlists to YouTube Music
    Transfer(TransferOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Discard stored credentials and authorize again
    #[clap(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TransferOptions {
    /// Playlists to transfer, by number (see `playlists`) or exact name
    #[clap(conflicts_with = "all")]
    pub playlists: Vec<String>,

    /// Transfer every playlist
    #[clap(long)]
    pub all: bool,

    /// What to match tracks against on YouTube
    #[clap(long, value_enum, default_value_t = SearchKind::Song)]
    pub kind: SearchKind,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Auth(opt) => cli::auth(opt.force).await,
        Command::Playlists => cli::list_playlists().await,
        Command::Transfer(opt) => cli::transfer(opt.playlists, opt.all, opt.kind).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
