use anyhow::Context;
use clap::{Parser, Subcommand};
use jaccard_lsh::config::ExperimentConfig;
use jaccard_lsh::data::{load_documents, load_ratings, Ratings};
use jaccard_lsh::experiment::report::{
    item_modulus, kgram_report, lsh_ratings_report, lsh_text_report, minhash_ratings_report,
    minhash_text_report, MinHashTextReport,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jaccard-lsh")]
#[command(about = "Exact Jaccard, MinHash and LSH experiments on documents and user ratings")]
struct Cli {
    /// JSON configuration file. Missing fields keep their defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the seed of every hash family.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Override the ratings CSV.
    #[arg(long, global = true)]
    ratings: Option<PathBuf>,

    /// Override the documents.
    #[arg(long = "doc", global = true)]
    documents: Vec<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distinct k-gram counts and pairwise Jaccard of the documents.
    Kgrams,
    /// MinHash estimates of document similarity for several family sizes.
    MinhashText,
    /// Optimal banding and per-pair candidate probabilities for the documents.
    LshText,
    /// MinHash pairs of similar users against exact Jaccard.
    MinhashRatings,
    /// LSH candidate pairs of similar users against exact Jaccard.
    LshRatings,
    /// Run every experiment.
    All,
    /// Print the default configuration as JSON.
    PrintDefaultConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<ExperimentConfig> {
    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(ratings) = &cli.ratings {
        config.ratings = ratings.clone();
    }
    if !cli.documents.is_empty() {
        config.documents = cli.documents.clone();
    }
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "stats")]
fn log_error_model(report: &MinHashTextReport) {
    for (pair, exact) in &report.exact {
        if let Some(s) = exact {
            for (t, _) in &report.estimates {
                info!(
                    pair = %pair,
                    hashes = t,
                    std_error = jaccard_lsh::stats::std_error(*s, *t),
                    "estimator error"
                );
            }
        }
    }
}

#[cfg(not(feature = "stats"))]
fn log_error_model(_report: &MinHashTextReport) {}

struct Runner {
    config: ExperimentConfig,
    ratings: Option<(Ratings, u64)>,
}

impl Runner {
    fn ratings(&mut self) -> anyhow::Result<&(Ratings, u64)> {
        if self.ratings.is_none() {
            let path = &self.config.ratings;
            let ratings = load_ratings(path, self.config.row_policy)
                .with_context(|| format!("reading ratings {}", path.display()))?;
            let modulus = item_modulus(self.config.modulus, &ratings)?;
            info!(modulus, "affine hash modulus");
            self.ratings = Some((ratings, modulus));
        }
        self.ratings
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("ratings not loaded"))
    }

    fn kgrams(&mut self) -> anyhow::Result<()> {
        let docs = load_documents(&self.config.documents)?;
        println!("{}", kgram_report(&docs, &self.config.kgrams));
        Ok(())
    }

    fn minhash_text(&mut self) -> anyhow::Result<()> {
        let docs = load_documents(&self.config.documents)?;
        let report = minhash_text_report(&docs, &self.config.minhash_text, self.config.seed)?;
        log_error_model(&report);
        println!("{}", report);
        Ok(())
    }

    fn lsh_text(&mut self) -> anyhow::Result<()> {
        let docs = load_documents(&self.config.documents)?;
        println!(
            "{}",
            lsh_text_report(&docs, &self.config.lsh_text, self.config.seed)?
        );
        Ok(())
    }

    fn minhash_ratings(&mut self) -> anyhow::Result<()> {
        let seed = self.config.seed;
        let config = self.config.minhash_ratings.clone();
        let (ratings, modulus) = self.ratings()?;
        println!(
            "{}",
            minhash_ratings_report(&ratings.users, *modulus, &config, seed)?
        );
        Ok(())
    }

    fn lsh_ratings(&mut self) -> anyhow::Result<()> {
        let seed = self.config.seed;
        let config = self.config.lsh_ratings.clone();
        let (ratings, modulus) = self.ratings()?;
        println!(
            "{}",
            lsh_ratings_report(&ratings.users, *modulus, &config, seed)?
        );
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::PrintDefaultConfig = cli.command {
        println!("{}", ExperimentConfig::default().to_json()?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    info!(seed = config.seed, "starting");
    let mut runner = Runner {
        config,
        ratings: None,
    };

    match cli.command {
        Commands::Kgrams => runner.kgrams()?,
        Commands::MinhashText => runner.minhash_text()?,
        Commands::LshText => runner.lsh_text()?,
        Commands::MinhashRatings => runner.minhash_ratings()?,
        Commands::LshRatings => runner.lsh_ratings()?,
        Commands::All => {
            runner.kgrams()?;
            runner.minhash_text()?;
            runner.lsh_text()?;
            runner.minhash_ratings()?;
            runner.lsh_ratings()?;
        }
        Commands::PrintDefaultConfig => {}
    }
    Ok(())
}
