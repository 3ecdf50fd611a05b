use crate::repository::{ManifestStore, Product};
use clap::{ArgAction, Parser};
use tracing::Level;

#[derive(Debug, Clone)]
pub enum Command {
    Fetch {
        config_path: Option<String>,
        product: Product,
        years: Vec<String>,
        output_dir: Option<String>,
    },
    List {
        config_path: Option<String>,
        product: Product,
        years: Vec<String>,
        json: bool,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "loopfetch",
    version,
    author = "Nick Guletskii",
    about = "Download the audio content packages GarageBand and Logic Pro install on first run"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'p',
        long = "product",
        value_enum,
        default_value_t = Product::GarageBand,
        help = "App to download content for"
    )]
    product: Product,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        conflicts_with = "list",
        help = "Download location, created if missing (default: config output_dir or the system temp directory)"
    )]
    output: Option<String>,

    #[arg(
        short = 'l',
        long = "list",
        help = "List package URLs and sizes with a total, without downloading"
    )]
    list: bool,

    #[arg(long = "json", requires = "list", help = "Print the listing as JSON")]
    json: bool,

    #[arg(
        short = 'y',
        long = "year",
        value_name = "YYYY",
        num_args = 0..,
        value_parser = parse_year,
        help = "Content release years to fetch (default, or a bare -y: all)"
    )]
    years: Vec<String>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (base_url, proxy, output_dir, user_agent)"
    )]
    config: Option<String>,
}

fn parse_year(value: &str) -> Result<String, String> {
    let store = ManifestStore::builtin();
    match store.year(value) {
        Some(year) => Ok(year.to_string()),
        None => Err(format!(
            "no content registered for {}; choose from {}",
            value,
            itertools::join(store.valid_years(), ", ")
        )),
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    for directive in ["hyper=warn", "hyper_util=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let command = if cli.list {
        Command::List {
            config_path: cli.config,
            product: cli.product,
            years: cli.years,
            json: cli.json,
        }
    } else {
        Command::Fetch {
            config_path: cli.config,
            product: cli.product,
            years: cli.years,
            output_dir: cli.output,
        }
    };

    Args { command, log_level }
}
