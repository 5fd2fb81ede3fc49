//! Synthetic log dataset for the demo driver.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARN", "ERROR", "FATAL"];

const SUBSYSTEMS: [&str; 6] = ["API", "DATABASE", "AUTH", "CACHE", "QUEUE", "WORKER"];

const MESSAGES: [&str; 12] = [
    "Request processed successfully",
    "Database connection established",
    "User authentication failed",
    "Cache miss occurred",
    "Queue job completed",
    "Worker started processing",
    "API rate limit exceeded",
    "Database query timeout",
    "Invalid token provided",
    "Cache eviction triggered",
    "Queue processing delayed",
    "Worker memory usage high",
];

/// A single synthetic log line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Sequential id; doubles as the absolute dataset index.
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub level: &'static str,
    pub subsystem: &'static str,
    pub message: &'static str,
}

/// Generates `count` entries with random timestamps over the trailing 30
/// days, sorted chronologically and re-numbered so ids are sequential.
pub fn generate(count: usize) -> Vec<LogEntry> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before Unix epoch")
        .as_millis() as u64;
    let span_ms = 30 * 24 * 60 * 60 * 1_000u64;

    let mut rng = rand::rng();
    let mut entries: Vec<LogEntry> = (0..count)
        .map(|_| LogEntry {
            id: 0,
            timestamp_ms: now_ms - rng.random_range(0..span_ms),
            level: LEVELS[rng.random_range(0..LEVELS.len())],
            subsystem: SUBSYSTEMS[rng.random_range(0..SUBSYSTEMS.len())],
            message: MESSAGES[rng.random_range(0..MESSAGES.len())],
        })
        .collect();

    entries.sort_by_key(|e| e.timestamp_ms);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.id = i as u64;
    }
    entries
}
