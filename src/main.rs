// Operator trigger for slicefan.
//
// Two actions, mirroring the deployment's operator surface: trigger one
// fan-out run, or seed the target index with demo data. Configuration
// comes from SLICEFAN_* environment variables.

use anyhow::{Context, Result};
use std::sync::Arc;

use slicefan::{FanoutConfig, FanoutSession, LogSink, SearchBackend, seed_index};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn config_from_env() -> Result<FanoutConfig> {
    let mut builder = FanoutConfig::builder()
        .backend_url(env_or("SLICEFAN_BACKEND_URL", "http://localhost:9200"))
        .index(env_or("SLICEFAN_INDEX", "sample-records"));

    if let Ok(value) = std::env::var("SLICEFAN_PAGE_SIZE") {
        builder = builder.page_size(
            value
                .parse()
                .context("SLICEFAN_PAGE_SIZE must be an integer")?,
        );
    }
    if let Ok(value) = std::env::var("SLICEFAN_WORKERS") {
        builder = builder.worker_count(
            value
                .parse()
                .context("SLICEFAN_WORKERS must be an integer")?,
        );
    }
    if let Ok(value) = std::env::var("SLICEFAN_MAX_ATTEMPTS") {
        builder = builder.max_delivery_attempts(
            value
                .parse()
                .context("SLICEFAN_MAX_ATTEMPTS must be an integer")?,
        );
    }
    if let Ok(value) = std::env::var("SLICEFAN_SORT_FIELD") {
        builder = builder.sort_field(value);
    }
    if let Ok(value) = std::env::var("SLICEFAN_SCROLL_ALL") {
        builder = builder.scroll_to_exhaustion(value == "1" || value.eq_ignore_ascii_case("true"));
    }

    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = config_from_env()?;

    match args.first().map(String::as_str) {
        None | Some("run") => {
            let session = FanoutSession::start(config, Arc::new(LogSink))?;
            let report = match session.trigger().await {
                Ok(report) => report,
                Err(e) => {
                    session.shutdown().await;
                    return Err(e.into());
                }
            };
            session.drain().await;
            let snapshot = session.metrics();
            let dead_letters = session.shutdown().await;

            println!(
                "fan-out complete: {} documents, {} slices, {} published, {} dropped sends",
                report.total, report.slice_count, report.published, report.failed_sends,
            );
            println!(
                "delivered {} / redelivered {} / dead-lettered {}",
                snapshot.messages_delivered,
                snapshot.messages_redelivered,
                snapshot.messages_dead_lettered,
            );
            if !dead_letters.is_empty() {
                println!(
                    "{} work item(s) dead-lettered; see the error log for payloads",
                    dead_letters.len(),
                );
            }
            Ok(())
        }
        Some("seed") => {
            let count: usize = args
                .get(1)
                .map(|value| value.parse())
                .transpose()
                .context("seed count must be an integer")?
                .unwrap_or(100_000);

            let backend = SearchBackend::new(&config)?;
            let report = seed_index(&backend, count, config.seed_concurrency()).await;
            println!(
                "seeded {}/{} documents into {} ({} failed)",
                report.indexed,
                report.requested,
                config.index(),
                report.failed,
            );
            Ok(())
        }
        Some(other) => {
            eprintln!("unknown command '{other}'");
            eprintln!("usage: slicefan [run | seed <count>]");
            std::process::exit(2);
        }
    }
}
