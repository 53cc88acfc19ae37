//! Main entry point for the namescout CLI
//!
//! Runs a single search job to completion with real or offline services and
//! prints the resulting leaderboard.

use anyhow::Context;
use clap::Parser;

use engine::{build_engine, EngineArgs};
use shared::{
    logging, JobStatus, LeaderboardQuery, NameStyle, ProcessId, Randomness,
    SearchJob, SearchRequest, SortMode,
};

/// Discover, price and rank domain names against a yearly budget
#[derive(Parser)]
#[command(name = "namescout")]
#[command(about = "Iteratively discovers available domain names that fit a budget")]
pub struct Args {
    /// Keywords describing the business or product
    #[arg(long)]
    pub keywords: String,

    /// Optional longer description fed to the generator
    #[arg(long, default_value = "")]
    pub description: String,

    /// Naming style (auto, brandable, evocative, short_phrase, compound_words, alternate_spelling, non_english, real_words)
    #[arg(long, default_value = "auto")]
    pub style: NameStyle,

    /// Generator randomness (low, medium, high)
    #[arg(long, default_value = "medium")]
    pub randomness: Randomness,

    /// Words the generated names must avoid
    #[arg(long, default_value = "")]
    pub blacklist: String,

    /// Maximum label length
    #[arg(long, default_value = "15")]
    pub max_length: u8,

    /// Target TLD
    #[arg(long, default_value = "com")]
    pub tld: String,

    /// Qualifying names wanted per loop
    #[arg(long, default_value = "25")]
    pub max_names: u32,

    /// Yearly registration budget
    #[arg(long, default_value = "50")]
    pub budget: f64,

    /// Number of optimization loops
    #[arg(long, default_value = "3")]
    pub loops: u32,

    /// Leaderboard ordering
    #[arg(long, default_value = "overall")]
    pub sort: SortMode,

    /// Number of leaderboard rows to print
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Print the final job as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl Args {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            keywords: self.keywords.clone(),
            description: self.description.clone(),
            style: self.style,
            randomness: self.randomness,
            blacklist: self.blacklist.clone(),
            max_length: self.max_length,
            tld: self.tld.clone(),
            max_names: self.max_names,
            yearly_budget: self.budget,
            loop_count: self.loops,
        }
    }
}

fn print_table(job: &SearchJob) {
    let Some(results) = job.results.as_ref() else {
        println!("No results.");
        return;
    };

    println!(
        "{:>3}  {:<28} {:>9} {:>8} {:>8} {:>8} {:>5} {:>7}",
        "#", "domain", "price", "overall", "market", "finance", "syl", "loops"
    );
    for (rank, r) in results.domains.iter().enumerate() {
        println!(
            "{:>3}  {:<28} {:>9} {:>8.2} {:>8.2} {:>8.2} {:>5} {:>7}",
            rank + 1,
            r.domain,
            r.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "?".to_string()),
            r.overall_score,
            r.marketability_score,
            r.financial_value_score,
            r.syllables,
            format!("{}-{}x{}", r.first_seen_loop, r.last_seen_loop, r.times_discovered),
        );
    }

    println!();
    for summary in &results.loops {
        println!(
            "loop {:>2}: {:<18} {:<7} {:<7} {:>3}/{:<3} qualifying, {:>3} considered, reward {:.3}{}",
            summary.loop_index,
            summary.params.style.as_str(),
            summary.params.randomness.as_str(),
            summary.params.mutation.as_str(),
            summary.within_budget,
            summary.required_quota,
            summary.considered,
            summary.reward,
            summary
                .skip_reason
                .as_deref()
                .map(|r| format!(" [{r}]"))
                .unwrap_or_default()
        );
    }
    if let Some(best) = results.best_loop {
        println!("best loop: {best}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    ProcessId::init_engine();
    logging::init_tracing(Some(&args.log_level));

    let config = args.engine.clone().into_config()?;
    let engine = build_engine(args.engine.provider, config)?;

    logging::log_startup(ProcessId::current(), &format!("search for '{}'", args.keywords));
    let job = engine
        .run_to_completion(args.request())
        .await
        .context("search request rejected")?;

    let query = LeaderboardQuery {
        sort: args.sort,
        limit: Some(args.limit),
        ..Default::default()
    };
    let job = engine.job(job.id, &query).await.unwrap_or(job);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_table(&job);
    }

    match (job.status, job.error.as_ref()) {
        (JobStatus::Done, _) => {
            logging::log_success(ProcessId::current(), "Search completed");
            Ok(())
        }
        (_, Some(error)) => anyhow::bail!("search failed with {}: {}", error.code, error.message),
        (status, None) => anyhow::bail!("search ended in unexpected state {status:?}"),
    }
}
