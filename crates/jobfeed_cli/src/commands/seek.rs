//! The `seek` command: find the page where a date begins.

use std::sync::Arc;

use chrono::NaiveDate;
use console::style;
use jobfeed::feed::FeedClient;
use jobfeed::retry::RetryConfig;
use jobfeed::sync::find_page_for_date;

use crate::commands::sync::start_of_day;
use crate::config::Config;

pub(crate) async fn handle_seek(
    date: NaiveDate,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = config.feed_token().ok_or(
        "No feed token configured. Set feed.token in the config file, \
         JOBFEED_FEED_TOKEN or NAV_API_TOKEN.",
    )?;
    let client = Arc::new(FeedClient::new(&config.feed.url, &token)?);

    match find_page_for_date(client, start_of_day(date), RetryConfig::default()).await? {
        Some(page) => {
            println!("{}", page);
            eprintln!(
                "{} resume with: jobfeed sync --start-page-id {}",
                style("hint:").dim(),
                page
            );
        }
        None => {
            eprintln!("No page with postings on or after {date} was found.");
        }
    }

    Ok(())
}
