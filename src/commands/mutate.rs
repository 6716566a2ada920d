use anyhow::Result;
use eventboard_core::date_range::parse_date;
use eventboard_core::{AnalyticsSink, FilterEngine, QueryParams};
use owo_colors::OwoColorize;

/// Print the next query string and how many events it matches.
pub fn report<S: AnalyticsSink>(engine: &FilterEngine<S>, params: &QueryParams) -> Result<()> {
    let query = params.to_query_string();

    if query.is_empty() {
        println!("{}", "(no filters)".dimmed());
    } else {
        println!("?{}", query);
    }

    let count = engine.filtered_events().len();
    println!(
        "{}",
        format!("{} of {} events match", count, engine.events().len()).dimmed()
    );

    Ok(())
}

pub fn dates<S: AnalyticsSink>(
    engine: &mut FilterEngine<S>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    // Typed input is rejected loudly; only URL state degrades silently.
    let start = start.map(parse_date).transpose().map_err(|e| anyhow::anyhow!(e))?;
    let end = end.map(parse_date).transpose().map_err(|e| anyhow::anyhow!(e))?;

    let params = engine.set_date_range(start, end);
    report(engine, &params)
}
