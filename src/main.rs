use haiyomi::advice::{exchange_tiles, recommend_excluded_suit};
use haiyomi::hand::{count_tiles, parse_tiles, tiles_to_string};
use haiyomi::cache::CacheStats;
use haiyomi::{Analyzer, DangerContext, EfficiencyConfig, Hand, HandReport, ShapeKind, Suit};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// Hands analyzed between clears of the per-hand shanten cache.
const BATCH_CHUNK: usize = 4096;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "haiyomi", about = "Shanten, ukeire and discard analysis for mahjong hands")]
struct Cli {
    /// -v for info, -vv for debug, -vvv for per-candidate traces.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report on a single hand, e.g. "123456789m 1123p E" or "234m 55p 678s +2".
    Analyze {
        hand: String,
        #[command(flatten)]
        options: AnalysisOptions,
    },
    /// Report on one hand per line. Visible tiles may follow a tab.
    Batch {
        /// Plain or .gz file. Reads stdin when omitted.
        input: Option<PathBuf>,
        #[command(flatten)]
        options: AnalysisOptions,
        /// Number of rayon threads (0 = auto).
        #[arg(long, default_value = "0")]
        threads: usize,
    },
    /// Suit to give up under the excluded-suit rule.
    Suit { hand: String },
    /// Same-suit tiles to pass in the exchange.
    Exchange {
        hand: String,
        #[arg(short = 'n', long, default_value = "3")]
        count: u8,
    },
}

#[derive(clap::Args, Debug)]
struct AnalysisOptions {
    /// Tiles seen outside the hand, in hand notation.
    #[arg(long, default_value = "")]
    visible: String,

    /// Suit that may not be kept (m, p or s).
    #[arg(long)]
    excluded: Option<Suit>,

    /// standard, seven-pairs or thirteen-orphans.
    #[arg(long, default_value = "standard")]
    shape: ShapeKind,

    /// Skip the one-draw lookahead on near ties.
    #[arg(long)]
    no_peak: bool,

    /// Do not penalize discarding middle tiles and dragons.
    #[arg(long)]
    no_centrality: bool,

    /// JSON file with discard history, visible tiles, turn and threat.
    #[arg(long)]
    danger: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl AnalysisOptions {
    fn config(&self) -> Result<EfficiencyConfig> {
        let danger = match &self.danger {
            Some(path) => {
                let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
                let context: DangerContext = serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("failed to parse danger context {}", path.display()))?;
                Some(context)
            }
            None => None,
        };
        Ok(EfficiencyConfig {
            shape: self.shape,
            peak_theory: !self.no_peak,
            centrality_penalty: !self.no_centrality,
            danger,
            ..Default::default()
        })
    }

    fn render(&self, report: &HandReport) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string(report)?)
        } else {
            Ok(report.to_log_string())
        }
    }
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            log::Level::Error => style("ERROR").red().bold(),
            log::Level::Warn => style("WARN ").yellow(),
            log::Level::Info => style("INFO ").green(),
            log::Level::Debug => style("DEBUG").cyan(),
            log::Level::Trace => style("TRACE").dim(),
        };
        eprintln!("{level} {}", record.args());
    }

    fn flush(&self) {}
}

fn init_logger(verbose: u8) -> Result<()> {
    log::set_boxed_logger(Box::new(Logger)).context("failed to install logger")?;
    log::set_max_level(match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });
    Ok(())
}

fn parse_hand(s: &str) -> Result<Hand> {
    s.parse().with_context(|| format!("failed to parse hand \"{s}\""))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    let Some(path) = path else {
        return Ok(Box::new(BufReader::new(io::stdin())));
    };
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn analyze_line(analyzer: &Analyzer, line: &str, options: &AnalysisOptions, config: &EfficiencyConfig) -> Result<String> {
    let (hand, visible) = line.split_once('\t').unwrap_or((line, ""));
    let hand = parse_hand(hand)?;
    let visible = parse_tiles(visible).context("failed to parse visible tiles")?;
    let report = HandReport::analyze(analyzer, &hand, &visible, options.excluded, config)?;
    options.render(&report)
}

fn log_cache_stats(stats: &CacheStats) {
    log::debug!(
        "cache: {} suit entries, {} hand entries, {} hits, {} misses",
        stats.suit_entries,
        stats.hand_entries,
        stats.hits,
        stats.misses
    );
}

fn batch(analyzer: &Analyzer, input: Option<&Path>, options: &AnalysisOptions) -> Result<()> {
    let config = options.config()?;
    let lines = open_input(input)?
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .context("failed to read input")?
        .into_iter()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>();
    log::info!("analyzing {} hands", lines.len());

    let bar = ProgressBar::new(lines.len() as u64)
        .with_style(ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]")?);
    let mut results = Vec::with_capacity(lines.len());
    for chunk in lines.chunks(BATCH_CHUNK) {
        results.par_extend(chunk.par_iter().map(|line| {
            let result = analyze_line(analyzer, line, options, &config);
            bar.inc(1);
            result
        }));
        if let Some(cache) = analyzer.cache() {
            log_cache_stats(&cache.stats());
            cache.clear_hands();
        }
    }
    bar.finish();

    let mut failed = 0;
    for (line, result) in lines.iter().zip(results) {
        match result {
            Ok(out) => println!("{out}"),
            Err(e) => {
                failed += 1;
                log::warn!("{line}: {e:#}");
            }
        }
    }
    if failed > 0 {
        log::warn!("{failed} of {} hands could not be analyzed", lines.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;
    let analyzer = Analyzer::new();

    match &cli.command {
        Command::Analyze { hand, options } => {
            let hand = parse_hand(hand)?;
            let visible = parse_tiles(&options.visible).context("failed to parse visible tiles")?;
            let report = HandReport::analyze(&analyzer, &hand, &visible, options.excluded, &options.config()?)?;
            println!("{}", options.render(&report)?);
        }
        Command::Batch {
            input,
            options,
            threads,
        } => {
            if *threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build_global()
                    .context("failed to build thread pool")?;
            }
            batch(&analyzer, input.as_deref(), options)?;
        }
        Command::Suit { hand } => {
            let hand = parse_hand(hand)?;
            println!("{}", recommend_excluded_suit(&analyzer, &hand)?);
        }
        Command::Exchange { hand, count } => {
            let hand = parse_hand(hand)?;
            let tiles = exchange_tiles(&analyzer, &hand, *count)?;
            println!("{}", tiles_to_string(&count_tiles(&tiles)));
        }
    }
    Ok(())
}
