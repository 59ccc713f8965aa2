mod verbose;

use clap::{Parser, Subcommand, IntoApp as _, FromArgMatches as _};
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use twelf::Layer;

use whatif_command_console::GenerateArgs;
use whatif_common::{models::{Length, StoryId}, Conf};
use whatif_views::archive::{SortMode, HISTORY_LIMIT};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(flatten)]
    verbose: verbose::Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the preset universes the service offers
    Universes,
    /// Generate a new story
    Generate {
        /// The "What If" scenario to write about
        what_if: String,
        /// A preset universe, the service's first one when left out
        #[clap(long, short = 'u', conflicts_with = "custom")]
        universe: Option<String>,
        /// Name of a universe of your own
        #[clap(long, short = 'c')]
        custom: Option<String>,
        /// Narration instructions for a custom universe
        #[clap(long, requires = "custom")]
        system_prompt: Option<String>,
        #[clap(long, short = 'l', default_value = "medium")]
        length: Length,
    },
    /// Browse previously generated stories
    History {
        /// Only show stories from this universe
        #[clap(long, short = 'u', default_value = "all")]
        universe: String,
        #[clap(long, short = 's', default_value = "newest")]
        sort: SortMode,
        #[clap(long, default_value_t = HISTORY_LIMIT)]
        limit: usize,
    },
    /// Show a single story in full
    Show { id: StoryId },
    /// Rate a story from 1 to 5 stars
    Rate { id: StoryId, rating: u8 },
    /// Create a public link for a story
    Share { id: StoryId },
    /// Open a shared story, optionally rating it
    Shared {
        token: String,
        #[clap(long, short = 'r')]
        rate: Option<u8>,
    },
    /// Summarize the whole archive
    Stats,
    /// Start the built-in web server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), whatif_common::Report> {
    whatif_common::install()?;

    let matches = Cli::command().args(&Conf::clap_args()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let conf = Conf::with_layers(&[
        Layer::Json("whatif.json".into()),
        Layer::Toml("whatif.toml".into()),
        Layer::Env(Some("WHATIF_".to_string())),
        Layer::Clap(matches)
    ])?;

    let subscriber = Registry::default()
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(cli.verbose.log_level_filter().into()));

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Universes => whatif_command_console::universes(&conf).await?,
        Commands::Generate { what_if, universe, custom, system_prompt, length } => {
            let args = GenerateArgs {
                what_if,
                universe,
                custom_universe: custom,
                system_prompt,
                length,
            };

            whatif_command_console::generate(&conf, args).await?
        }
        Commands::History { universe, sort, limit } => {
            whatif_command_console::history(&conf, &universe, sort, limit).await?
        }
        Commands::Show { id } => whatif_command_console::show(&conf, id).await?,
        Commands::Rate { id, rating } => whatif_command_console::rate(&conf, id, rating).await?,
        Commands::Share { id } => whatif_command_console::share(&conf, id).await?,
        Commands::Shared { token, rate } => whatif_command_console::shared(&conf, &token, rate).await?,
        Commands::Stats => whatif_command_console::stats(&conf).await?,
        Commands::Serve => whatif_command_serve::run(&conf).await?,
    }

    Ok(())
}
