//! Kalshi MLB In-Game Bot CLI
//!
//! Live win-probability trading on Kalshi MLB game-winner markets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kalshi_mlb_bot::odds::expected_margin;
use kalshi_mlb_bot::sizing::{dynamic_kelly_fraction, kelly_stake};
use kalshi_mlb_bot::types::{EventQuote, GameState, MarketQuote};
use kalshi_mlb_bot::{
    build_combined_table, event_ticker_today, market_ticker, poll_odds, replay_session,
    run_session, Config, DecisionEngine, FixedOddsFeed, FixedQuoteAdapter, OddsSnapshot,
    PaperExecutor,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "kalshi-mlb-bot")]
#[command(about = "Live win-probability trading on Kalshi MLB markets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the historical stat files and report what was built
    Tables,

    /// Expected run margin implied by a sportsbook line
    Margin {
        /// Home run-line spread (e.g. 1.5)
        #[arg(long)]
        home_spread: f64,

        /// Away run-line spread (e.g. -1.5)
        #[arg(long)]
        away_spread: f64,

        /// Home American odds (e.g. 145)
        #[arg(long)]
        home_odds: f64,

        /// Away American odds (e.g. -188)
        #[arg(long)]
        away_odds: f64,

        /// Margin-of-victory standard deviation
        #[arg(long, default_value = "3.0")]
        std_dev: f64,
    },

    /// Kelly sizing for a probability/price/game-state combination
    Size {
        /// Estimated win probability (0-1)
        #[arg(short, long)]
        probability: f64,

        /// Contract price in dollars (0-1)
        #[arg(long)]
        price: f64,

        /// Bankroll in dollars
        #[arg(short, long, default_value = "100")]
        bankroll: f64,

        /// Current inning
        #[arg(short, long, default_value = "1")]
        inning: u8,

        /// Leverage index of the moment
        #[arg(short, long, default_value = "1.0")]
        leverage: f64,
    },

    /// Live paper session: game states on stdin, decisions to the log
    Run {
        /// Away team code (e.g. BOS)
        #[arg(long)]
        away: String,

        /// Home team code (e.g. NYY)
        #[arg(long)]
        home: String,

        /// Pinned home-market quote in cents: yes_bid yes_ask no_bid no_ask
        #[arg(long, num_args = 4, default_values = ["48", "52", "48", "52"])]
        quote: Vec<u32>,

        /// Sportsbook line to poll: home_spread away_spread home_odds away_odds
        #[arg(long, num_args = 4)]
        line: Option<Vec<f64>>,
    },

    /// Replay a recorded session file (JSON lines of state + quote)
    Replay {
        /// Path to the transcript
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    match cli.command {
        Commands::Tables => show_tables(&config)?,
        Commands::Margin {
            home_spread,
            away_spread,
            home_odds,
            away_odds,
            std_dev,
        } => show_margin(home_spread, away_spread, home_odds, away_odds, std_dev),
        Commands::Size {
            probability,
            price,
            bankroll,
            inning,
            leverage,
        } => show_size(&config, probability, price, bankroll, inning, leverage),
        Commands::Run {
            away,
            home,
            quote,
            line,
        } => run_live(&config, &away, &home, &quote, line.as_deref()).await?,
        Commands::Replay { file } => replay_file(&config, &file)?,
    }

    Ok(())
}

fn show_tables(config: &Config) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("  HISTORICAL TABLES");
    println!("{}\n", "=".repeat(70));

    let (table, report) = build_combined_table(&config.table_sources());

    for (name, source) in [
        ("Win stats", report.win_stats),
        ("Leverage", report.leverage),
        ("Run expectancy", report.run_expectancy),
    ] {
        if source.missing {
            println!("  {:<16} MISSING", name);
        } else {
            println!(
                "  {:<16} {} loaded, {} skipped",
                name, source.loaded, source.skipped
            );
        }
    }
    println!("\n  Combined states: {}", table.len());

    // Probe a canonical late-game state so a fresh checkout can sanity-check
    // the files it was pointed at.
    let probe = GameState {
        inning: 9,
        is_top: false,
        outs: 2,
        bases: [0, 0, 0],
        home_scores: 3,
        away_scores: 8,
        balls: 0,
        strikes: 0,
    };
    let key = probe.state_key();
    match table.lookup(&key) {
        Some(entry) => println!(
            "  Probe [{}]: win {:?}, leverage {:?}, runs {:?}",
            key, entry.win_probability, entry.leverage_index, entry.expected_runs
        ),
        None => println!("  Probe [{}]: no entry", key),
    }

    Ok(())
}

fn show_margin(home_spread: f64, away_spread: f64, home_odds: f64, away_odds: f64, std_dev: f64) {
    let margin = expected_margin(home_spread, away_spread, home_odds, away_odds, std_dev);
    println!(
        "Expected away-team margin: {:.2} runs (spreads {:+}/{:+}, odds {}/{})",
        margin, home_spread, away_spread, home_odds, away_odds
    );
}

fn show_size(
    config: &Config,
    probability: f64,
    price: f64,
    bankroll: f64,
    inning: u8,
    leverage: f64,
) {
    let fraction = dynamic_kelly_fraction(probability, inning, leverage, config.model_confidence);
    let result = kelly_stake(probability, price, bankroll, fraction);
    let contracts = (result.stake / price).round() as u32;

    println!("Kelly fraction:  {:.3}", fraction);
    println!("Stake:           ${:.2}", result.stake);
    println!("Contracts at ${:.2}: {}", price, contracts);
    println!("EV per contract: ${:.3}", result.expected_value);
}

async fn run_live(
    config: &Config,
    away: &str,
    home: &str,
    quote: &[u32],
    line: Option<&[f64]>,
) -> Result<()> {
    let event = event_ticker_today(away, home);
    let home_market = market_ticker(&event, home);

    println!("\n{}", "=".repeat(70));
    println!("  LIVE SESSION  {}", event);
    println!(
        "  Paper Trading: {} | Bankroll: ${:.2} | Confidence: {:.2}",
        if config.paper_trading { "YES" } else { "NO - LIVE MODE" },
        config.starting_bankroll,
        config.model_confidence
    );
    println!("{}\n", "=".repeat(70));

    let (table, _) = build_combined_table(&config.table_sources());
    let engine = DecisionEngine::new(
        Arc::new(table),
        config.starting_bankroll,
        config.model_confidence,
    );
    let quotes = FixedQuoteAdapter::new(EventQuote {
        home: MarketQuote {
            yes_bid: quote[0],
            yes_ask: quote[1],
            no_bid: quote[2],
            no_ask: quote[3],
        },
        away: MarketQuote {
            yes_bid: quote[2],
            yes_ask: quote[3],
            no_bid: quote[0],
            no_ask: quote[1],
        },
    });
    let executor = PaperExecutor::new();

    let (state_tx, state_rx) = tokio::sync::mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let feed = tokio::spawn(kalshi_mlb_bot::feed::stdin_feed(state_tx));

    let odds_feed = FixedOddsFeed::new(line.map(|l| OddsSnapshot {
        home_spread: l[0],
        away_spread: l[1],
        home_odds: l[2],
        away_odds: l[3],
    }));
    let odds_shutdown = shutdown_rx.clone();
    let interval = config.odds_poll_interval;
    let odds = tokio::spawn(async move {
        poll_odds(&odds_feed, interval, odds_shutdown).await;
    });

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            let _ = ctrl_c_tx.send(true);
        }
    });

    println!("Reading game states from stdin (Ctrl+C to stop)...\n");
    let summary = run_session(
        engine,
        &quotes,
        &executor,
        &event,
        &home_market,
        state_rx,
        shutdown_rx,
    )
    .await?;

    let _ = shutdown_tx.send(true);
    odds.await?;
    feed.abort();

    println!("\n{}", "-".repeat(70));
    println!(
        "Final bankroll: ${:.2} | Position: {} home / {} away | {} cycles, {} trades",
        summary.bankroll,
        summary.position.home_contracts,
        summary.position.away_contracts,
        summary.cycles,
        summary.trades
    );

    Ok(())
}

fn replay_file(config: &Config, file: &PathBuf) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("  REPLAY  {}", file.display());
    println!("{}\n", "=".repeat(70));

    let records = kalshi_mlb_bot::feed::read_replay(file)?;
    println!("Loaded {} records\n", records.len());

    let (table, _) = build_combined_table(&config.table_sources());
    let engine = DecisionEngine::new(
        Arc::new(table),
        config.starting_bankroll,
        config.model_confidence,
    );
    let summary = replay_session(engine, &records);

    println!("\n{}", "-".repeat(70));
    println!(
        "Final bankroll: ${:.2} | Position: {} home / {} away | {} cycles, {} trades",
        summary.bankroll,
        summary.position.home_contracts,
        summary.position.away_contracts,
        summary.cycles,
        summary.trades
    );

    Ok(())
}
