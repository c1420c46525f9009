//! The `sync` command: one resumable ingestion pass.

use std::sync::Arc;

use chrono::NaiveDate;
use console::style;
use jobfeed::feed::{Anchor, FeedClient};
use jobfeed::sync::{SyncOptions, SyncSummary, run_sync};
use jobfeed::db;

use crate::SyncArgs;
use crate::config::Config;
use crate::progress::LoggingReporter;
use crate::shutdown;

/// Maximum number of failed ids listed in the summary.
const MAX_LISTED_FAILURES: usize = 10;

/// Midnight UTC at the start of `date`.
pub(crate) fn start_of_day(date: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Build library options from CLI flags layered over config.
pub(crate) fn build_options(args: &SyncArgs, config: &Config) -> SyncOptions {
    let anchor = if args.from_beginning {
        Anchor::Begin
    } else {
        config.sync.anchor.into()
    };

    SyncOptions {
        start_locator: args.start_page_id.clone(),
        anchor,
        limit: args.limit,
        since: args.start_date.map(start_of_day),
        concurrency: args.concurrency.unwrap_or(config.sync.concurrency).max(1),
        prefilter_summary: args.summary_prefilter || config.sync.prefilter,
        reset: args.reset,
        ..Default::default()
    }
}

pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = config.feed_token().ok_or(
        "No feed token configured. Set feed.token in the config file, \
         JOBFEED_FEED_TOKEN or NAV_API_TOKEN.",
    )?;
    let client = Arc::new(FeedClient::new(&config.feed.url, &token)?);

    let options = build_options(&args, config);
    let pool_size = u32::try_from(options.concurrency.saturating_mul(2)).unwrap_or(u32::MAX);
    let db = db::connect_with_pool(database_url, pool_size).await?;
    db::prepare_schema(&db).await?;

    shutdown::setup_shutdown_handler(options.stop_signal.clone());

    let reporter = Arc::new(LoggingReporter::new());
    let callback = reporter.as_callback();

    let summary = run_sync(client, &db, &options, Some(&callback)).await?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("{}", style("Sync summary").bold());
    println!("  Pages:    {}", summary.pages);
    println!("  Saved:    {}", style(summary.saved).green());
    println!("  Skipped:  {}", style(summary.skipped_count()).yellow());
    if summary.failed.is_empty() {
        println!("  Failed:   0");
    } else {
        println!("  Failed:   {}", style(summary.failed_count()).red());
        for item in summary.failed.iter().take(MAX_LISTED_FAILURES) {
            println!("    - {}: {}", item.id, item.error);
        }
        if summary.failed.len() > MAX_LISTED_FAILURES {
            println!(
                "    ... and {} more",
                summary.failed.len() - MAX_LISTED_FAILURES
            );
        }
    }
    println!("  Stopped:  {}", summary.stop_reason);
    match summary.resume_locator.as_deref() {
        Some(locator) => println!("  Resume:   {}", style(locator).cyan()),
        None => println!("  Resume:   {}", style("(no cursor)").dim()),
    }
}
