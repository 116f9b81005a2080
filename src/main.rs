use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotab::{cli, config, warning};

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
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check client credentials against the token endpoint
    Auth,

    /// Export playlists, tracks and artists as CSV tables
    Run(RunArgs),

    /// List the playlists of a user
    Playlists(PlaylistsOptions),

    /// Flatten a JSON file into flat records
    Flatten(FlattenOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Spotify user whose playlists are exported (defaults to SPOTIFY_USER_ID)
    #[clap(long)]
    pub user: Option<String>,

    /// Directory the CSV tables are written to (defaults to SPOTAB_OUTPUT_DIR or ./output)
    #[clap(long)]
    pub out: Option<PathBuf>,

    /// Write raw playlists, tracks and artists as JSON checkpoints
    #[clap(long)]
    pub checkpoint: bool,

    /// Load collections from checkpoints instead of fetching them
    #[clap(long)]
    pub resume: bool,

    /// Artist IDs per lookup call
    #[clap(
        long,
        default_value_t = config::ARTIST_BATCH_LIMIT as u64,
        value_parser = clap::value_parser!(u64).range(1..=config::ARTIST_BATCH_LIMIT as u64)
    )]
    pub chunk_size: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Spotify user (defaults to SPOTIFY_USER_ID)
    #[clap(long)]
    pub user: Option<String>,

    /// Search playlists by name
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct FlattenOptions {
    /// JSON file holding an object or an array of objects
    pub file: PathBuf,

    /// Joins parent keys with sub-keys and indices
    #[clap(long, default_value = "_")]
    pub separator: String,

    /// Passes after which input is rejected as too deep
    #[clap(long, default_value_t = 64)]
    pub max_depth: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("{}. Using environment variables only.", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Run(opt) => {
            cli::run(cli::RunOptions {
                user: opt.user,
                out: opt.out,
                checkpoint: opt.checkpoint,
                resume: opt.resume,
                chunk_size: opt.chunk_size as usize,
            })
            .await
        }
        Command::Playlists(opt) => cli::list_playlists(opt.user, opt.search).await,
        Command::Flatten(opt) => cli::flatten_file(&opt.file, opt.separator, opt.max_depth).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
