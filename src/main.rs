//! Write cache benchmark (CLI binary).
//!
//! Inserts the same stream of documents into an in-memory store with a
//! simulated round-trip latency, once directly and once through the cache in
//! each write mode, and prints how long each run took.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use write_cache::config::DEFAULT_CACHE_SIZE;
use write_cache::initialization::init_logger_with;
use write_cache::{
    CacheConfig, Document, DocumentStore, FlushFailure, LogFormat, LogLevel, MemoryStore,
    Subscriber, WriteCache, WriteMode,
};

/// Command-line options for the benchmark.
///
/// # Examples
///
/// ```bash
/// # Compare direct inserts with both cache modes
/// write_cache_bench --documents 5000 --latency-ms 2
///
/// # Only the inline mode, with a smaller batch size
/// write_cache_bench --mode inline --cache-size 100
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "write_cache_bench",
    about = "Compares direct document inserts with batched writes through the write cache."
)]
struct Opt {
    /// Number of documents to insert per run
    #[arg(long, default_value_t = 2_000)]
    documents: usize,

    /// Buffered document count that triggers a flush
    #[arg(long, default_value_t = DEFAULT_CACHE_SIZE)]
    cache_size: usize,

    /// Periodic flush interval in milliseconds
    #[arg(long, default_value_t = 5_000)]
    flush_time_ms: u64,

    /// Simulated store latency per bulk call in milliseconds
    #[arg(long, default_value_t = 2)]
    latency_ms: u64,

    /// Run only this write mode (both modes run when omitted)
    #[arg(long, value_enum)]
    mode: Option<WriteMode>,

    /// Skip the direct-insert baseline
    #[arg(long)]
    skip_baseline: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

struct RunSummary {
    label: String,
    elapsed: Duration,
    store_calls: usize,
    stored: usize,
}

impl RunSummary {
    fn throughput(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.stored as f64 / seconds
        } else {
            0.0
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let latency = Duration::from_millis(opt.latency_ms);
    let mut summaries = Vec::new();

    if !opt.skip_baseline {
        summaries.push(run_direct(opt.documents, latency).await?);
    }

    let modes = match opt.mode {
        Some(mode) => vec![mode],
        None => vec![WriteMode::Inline, WriteMode::Background],
    };
    for mode in modes {
        let config = CacheConfig {
            mode,
            ..CacheConfig::new(opt.cache_size, Duration::from_millis(opt.flush_time_ms))
        };
        summaries.push(run_cached(opt.documents, latency, config).await?);
    }

    for summary in &summaries {
        println!(
            "{:<12} {:>8.3}s  {:>10.0} docs/s  {:>6} store call{}  {:>8} documents stored",
            summary.label,
            summary.elapsed.as_secs_f64(),
            summary.throughput(),
            summary.store_calls,
            if summary.store_calls == 1 { "" } else { "s" },
            summary.stored
        );
    }

    Ok(())
}

fn make_document(seq: usize) -> Document {
    let mut document = Document::new();
    document.insert("seq".into(), json!(seq));
    document.insert("created_at".into(), json!(chrono::Utc::now().to_rfc3339()));
    document
}

async fn run_direct(documents: usize, latency: Duration) -> Result<RunSummary> {
    let store = MemoryStore::<Document>::with_latency(latency);
    let start = Instant::now();

    for seq in 0..documents {
        store
            .insert_many(&[make_document(seq)])
            .await
            .context("Direct insert failed")?;
    }

    Ok(RunSummary {
        label: "direct".into(),
        elapsed: start.elapsed(),
        store_calls: store.call_count(),
        stored: store.documents().len(),
    })
}

async fn run_cached(documents: usize, latency: Duration, config: CacheConfig) -> Result<RunSummary> {
    let store = Arc::new(MemoryStore::<Document>::with_latency(latency));
    let mode = config.mode;
    let cache = WriteCache::new(Arc::clone(&store), config).context("Invalid cache configuration")?;

    cache.subscribe_on_error(Subscriber::new(|failure: &FlushFailure<Document>| {
        log::error!(
            "Batch {} lost {} documents: {}",
            failure.batch_id,
            failure.documents.len(),
            failure.error
        );
    }));

    let start = Instant::now();
    for seq in 0..documents {
        cache.insert_one(make_document(seq)).await;
    }
    cache.close().await.context("Final flush failed")?;
    let elapsed = start.elapsed();

    Ok(RunSummary {
        label: format!("{:?}", mode).to_lowercase(),
        elapsed,
        store_calls: store.call_count(),
        stored: store.documents().len(),
    })
}
