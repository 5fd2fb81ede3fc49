//! Terminal replay of a virtualized scroll session.
//!
//! Generates a synthetic log dataset, serves it to the cursor through the
//! index strategy, and walks the viewport the way a row-virtualized list
//! would: bootstrap, page down toward the tail, jump to the middle, page
//! back up. Window snapshots are printed after every step.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pagebuf_core::{BufferedCursor, CursorConfig, IndexStrategy};
use tracing::info;

mod generator;

use generator::LogEntry;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a scroll session over a synthetic log dataset", long_about = None)]
struct Cli {
    /// Number of log entries to generate.
    #[arg(long, default_value_t = 10_000)]
    total: usize,

    /// Entries fetched per page.
    #[arg(long, default_value_t = 20)]
    page_size: usize,

    /// Pages kept in memory.
    #[arg(long, default_value_t = 3)]
    retention_pages: usize,

    /// Pages to scroll forward before jumping to the middle.
    #[arg(long, default_value_t = 5)]
    scroll_pages: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let dataset: Arc<Vec<LogEntry>> = Arc::new(generator::generate(cli.total));
    info!(total = dataset.len(), "dataset generated");

    let source = Arc::clone(&dataset);
    let strategy = IndexStrategy::new(move |start: u64, count: usize| {
        let source = Arc::clone(&source);
        async move {
            let start = usize::try_from(start)?;
            let end = (start + count).min(source.len());
            Ok::<_, anyhow::Error>(
                source.get(start..end).map(<[LogEntry]>::to_vec).unwrap_or_default(),
            )
        }
    });

    let config = CursorConfig {
        page_size: cli.page_size,
        retention_pages: cli.retention_pages,
        ..CursorConfig::default()
    };
    let cursor = BufferedCursor::new(strategy, config);

    cursor.bootstrap().await?;
    print_window("bootstrap", &cursor);

    for _ in 0..cli.scroll_pages {
        cursor.load_after().await?;
        print_window("page down", &cursor);
    }

    let middle = (cli.total / 2) as u64;
    cursor
        .ensure_range(middle, middle + cli.page_size as u64)
        .await?;
    print_window("jump to middle", &cursor);

    for _ in 0..2 {
        cursor.load_before().await?;
        print_window("page up", &cursor);
    }

    Ok(())
}

/// Prints the window bounds and a few leading rows.
fn print_window(label: &str, cursor: &BufferedCursor<u64, LogEntry>) {
    let window = cursor.snapshot();
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        println!("[{label}] window empty");
        return;
    };
    println!(
        "[{label}] rows {}..={} ({} in memory, at_start={}, at_end={})",
        first.key,
        last.key,
        window.len(),
        cursor.is_at_start(),
        cursor.is_at_end(),
    );
    for entry in window.iter().take(3) {
        let e = &entry.value;
        println!(
            "    #{:<6} {} [{:<5}] {}: {}",
            e.id, e.timestamp_ms, e.level, e.subsystem, e.message
        );
    }
}
