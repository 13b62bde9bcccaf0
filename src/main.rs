use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tickertape::config::Config;
use tickertape::indicators::engine::{BollingerConfig, IndicatorConfig};
use tickertape::output::terminal;
use tickertape::prices::analyzer::StockAnalyzer;
use tickertape::prices::csv_file::CsvPriceSource;
use tickertape::prices::source::{Interval, LoadOptions, PriceSource};
use tickertape::prices::yahoo::YahooChartSource;
use tickertape::sentiment::traits::{mean_compound, SentimentScorer};
use tickertape::sentiment::vader::VaderScorer;
use tickertape::text::clean::headline_length;
use tickertape::text::news::load_news_column;
use tickertape::text::publisher::domain_counts;
use tickertape::text::stopwords::StopWords;
use tickertape::topics::corpus::{CorpusParams, CorpusProcessor};
use tickertape::topics::lda::{GibbsLda, LdaParams, DEFAULT_TOPIC_WORDS};

/// Tickertape: price indicators and news headline analysis.
///
/// Fetches a ticker's price history and appends technical indicators, or
/// reads a news export and extracts topics, sentiment, and publishers.
#[derive(Parser)]
#[command(name = "tickertape", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load prices for a ticker and append technical indicators
    Prices {
        /// The ticker symbol (e.g. AAPL)
        ticker: String,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Bar interval
        #[arg(long, value_enum, default_value_t = Interval::Daily)]
        interval: Interval,

        /// Read prices from a local CSV file instead of the chart API
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Also append Bollinger bands (20, 2.0)
        #[arg(long)]
        bollinger: bool,

        /// Also append daily returns
        #[arg(long)]
        returns: bool,

        /// Number of trailing rows to show (default: 10)
        #[arg(long, default_value = "10")]
        rows: usize,
    },

    /// Train a topic model over a column of a news CSV
    Topics {
        /// News CSV file
        file: PathBuf,

        /// Column holding the headline text
        #[arg(long, default_value = "headline")]
        column: String,

        /// Number of topics (default: 6)
        #[arg(long, default_value = "6")]
        num_topics: usize,

        /// Training passes (default: 6)
        #[arg(long, default_value = "6")]
        passes: usize,

        /// Drop tokens found in fewer documents than this (default: 5)
        #[arg(long, default_value = "5")]
        no_below: usize,

        /// Drop tokens found in more than this fraction of documents (default: 0.5)
        #[arg(long, default_value = "0.5")]
        no_above: f64,

        /// Vocabulary cap (default: 10000)
        #[arg(long, default_value = "10000")]
        keep_n: usize,

        /// Print the model summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score headline sentiment
    Sentiment {
        /// News CSV file
        file: PathBuf,

        /// Column holding the headline text
        #[arg(long, default_value = "headline")]
        column: String,

        /// Print scores as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count publisher domains
    Publishers {
        /// News CSV file
        file: PathBuf,

        /// Column holding the publisher
        #[arg(long, default_value = "publisher")]
        column: String,

        /// How many domains to list (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Summarize headline lengths
    Headlines {
        /// News CSV file
        file: PathBuf,

        /// Column holding the headline text
        #[arg(long, default_value = "headline")]
        column: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tickertape=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Prices {
            ticker,
            start,
            end,
            interval,
            csv,
            bollinger,
            returns,
            rows,
        } => {
            let ticker = ticker.trim().to_uppercase();
            let options = LoadOptions {
                start,
                end,
                interval,
            };

            let source: Box<dyn PriceSource> = match csv {
                Some(path) => {
                    info!(path = %path.display(), "Using local CSV price source");
                    Box::new(CsvPriceSource::new(path))
                }
                None => Box::new(YahooChartSource::new(&config.price_api_url)?),
            };

            println!("Loading {interval} prices for {ticker}...");
            let mut analyzer = StockAnalyzer::load(source.as_ref(), &ticker, &options).await?;

            let mut indicators = IndicatorConfig::default().with_trim(config.trim_policy);
            if bollinger {
                indicators = indicators.with_bollinger(BollingerConfig::default());
            }
            analyzer.add_indicators(&indicators)?;
            if returns {
                analyzer.add_returns()?;
            }

            terminal::display_price_tail(&analyzer.series, rows);
        }

        Commands::Topics {
            file,
            column,
            num_topics,
            passes,
            no_below,
            no_above,
            keep_n,
            json,
        } => {
            let texts = load_news_column(&file, &column)?;
            println!("Preparing corpus from {} headlines...", texts.len());

            let mut processor = CorpusProcessor::new(texts, StopWords::new(config.stopwords));
            processor.prepare_corpus(&CorpusParams {
                no_below,
                no_above,
                keep_n: Some(keep_n),
            })?;

            let params = LdaParams {
                num_topics,
                passes,
                random_state: config.lda_seed,
                ..LdaParams::default()
            };
            let pb = ProgressBar::new(params.total_sweeps() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Training [{bar:30}] {pos}/{len} sweeps ({eta})")?,
            );
            let result = processor.lda_topics_with(
                &GibbsLda::new(params),
                &mut |done: usize, _: usize| pb.set_position(done as u64),
            );
            pb.finish_and_clear();
            let (model, topics) = result?;

            if json {
                let summary: Vec<_> = (0..model.num_topics())
                    .map(|k| {
                        serde_json::json!({
                            "topic": k,
                            "terms": model.top_terms(k, DEFAULT_TOPIC_WORDS),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                terminal::display_topics(&model, DEFAULT_TOPIC_WORDS);
                println!();
                for line in &topics {
                    println!("{}", line.dimmed());
                }
            }
        }

        Commands::Sentiment { file, column, json } => {
            let texts = load_news_column(&file, &column)?;
            let scorer = VaderScorer::new();
            let scores = scorer.score_batch(&texts);

            if json {
                let rows: Vec<_> = texts
                    .iter()
                    .zip(&scores)
                    .map(|(text, score)| serde_json::json!({ "headline": text, "score": score }))
                    .collect();
                let out = serde_json::json!({
                    "mean_compound": mean_compound(&scores),
                    "headlines": rows,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                terminal::display_sentiment(&texts, &scores);
            }
        }

        Commands::Publishers { file, column, top } => {
            let publishers = load_news_column(&file, &column)?;
            let counts = domain_counts(&publishers, top);
            terminal::display_publishers(&counts);
        }

        Commands::Headlines { file, column } => {
            let headlines = load_news_column(&file, &column)?;
            let lengths = headline_length(&headlines);
            terminal::display_headline_summary(&lengths);
        }
    }

    Ok(())
}
