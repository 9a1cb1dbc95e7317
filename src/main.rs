use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_recommender::{
    view::{self, Command, ViewState},
    Config, Resources, TFIDFData, TFIDFVectorizer,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "job-recommender")]
#[command(about = "Job market analysis and TF-IDF job recommendations", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[arg(long, help = "Job catalog CSV (overrides config)")]
    data: Option<PathBuf>,

    #[arg(long, help = "Fitted vectorizer artifact (overrides config)")]
    model: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "More log output")]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show catalog statistics")]
    Stats,

    #[command(about = "Recommend postings for a query")]
    Search {
        #[arg(required = true, help = "Free-text query, e.g. 'senior data scientist'")]
        query: Vec<String>,

        #[arg(
            short,
            long,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Number of results (default from config)"
        )]
        k: Option<u64>,
    },

    #[command(about = "Show the most frequent job categories")]
    Analytics {
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },

    #[command(about = "Fit a vectorizer on the catalog and write the artifact")]
    Fit {
        #[arg(short, long, help = "Artifact path (default: model path)")]
        output: Option<PathBuf>,
    },

    #[command(about = "Interactive session")]
    Browse,

    #[command(about = "Show contact information")]
    Contact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    if let Some(data) = cli.data {
        config.data.path = data;
    }
    if let Some(model) = cli.model {
        config.model.path = model;
    }
    let mut resources = Resources::from_config(&config);

    match cli.command.unwrap_or(Commands::Browse) {
        Commands::Stats => show_stats(&mut resources),
        Commands::Search { query, k } => {
            let k = k.map_or(config.search.top_k, |k| k as usize);
            search(&mut resources, &query.join(" "), k)
        }
        Commands::Analytics { limit } => {
            let limit = limit.map_or(config.analytics.top_categories, |limit| limit as usize);
            show_analytics(&mut resources, limit, config.analytics.bar_width)
        }
        Commands::Fit { output } => {
            let output = output.unwrap_or_else(|| config.model.path.clone());
            fit(&mut resources, &config, &output)
        }
        Commands::Browse => browse(&mut resources, &config),
        Commands::Contact => {
            view::render(&ViewState::Contact, &mut resources, &config, &mut io::stdout().lock())?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = if verbose > 0 { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("job_recommender={level}").parse()?),
        )
        .init();
    Ok(())
}

fn show_stats(resources: &mut Resources) -> Result<()> {
    let catalog = resources
        .catalog()
        .with_context(|| format!("Failed to load {}", resources.data_path().display()))?;
    print!("{}", view::render_stats(&catalog.stats()));
    Ok(())
}

fn search(resources: &mut Resources, query: &str, k: usize) -> Result<()> {
    let recommender = resources.recommender().context("Failed to load system components")?;
    let results = recommender.recommend(query, k)?;
    print!("{}", view::render_recommendations(&results));
    Ok(())
}

fn show_analytics(resources: &mut Resources, limit: usize, bar_width: usize) -> Result<()> {
    let catalog = resources
        .catalog()
        .with_context(|| format!("Failed to load {}", resources.data_path().display()))?;
    println!("Top job categories");
    print!("{}", view::bar_chart(&catalog.category_counts(limit), bar_width));
    Ok(())
}

fn fit(resources: &mut Resources, config: &Config, output: &Path) -> Result<()> {
    let catalog = resources
        .catalog()
        .with_context(|| format!("Failed to load {}", resources.data_path().display()))?;
    let vectorizer: TFIDFVectorizer =
        TFIDFVectorizer::fit(&catalog.descriptions(), config.analyzer, config.fit.clone())
            .context("Failed to fit vectorizer")?;
    TFIDFData::from(&vectorizer)
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Fitted {} terms on {} postings -> {}",
        vectorizer.dim(),
        catalog.len(),
        output.display()
    );
    Ok(())
}

fn browse(resources: &mut Resources, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut state = ViewState::Home;

    writeln!(stdout, "Job Market Analysis and Recommendation System")?;
    write!(stdout, "{}", view::HELP)?;
    view::render(&state, resources, config, &mut stdout)?;

    loop {
        write!(stdout, "\n> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.parse::<Command>() {
            Ok(Command::Show(next)) => {
                state = next;
                view::render(&state, resources, config, &mut stdout)?;
            }
            Ok(Command::Reload) => {
                if resources.reload_if_changed() {
                    info!("reloading changed resources");
                } else {
                    writeln!(stdout, "Nothing changed on disk.")?;
                }
                view::render(&state, resources, config, &mut stdout)?;
            }
            Ok(Command::Help) => write!(stdout, "{}", view::HELP)?,
            Ok(Command::Quit) => break,
            Err(err) => writeln!(stdout, "{err}")?,
        }
    }
    Ok(())
}
