use anyhow::Result;
use eventboard_core::{AnalyticsSink, FilterEngine};
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run<S: AnalyticsSink>(engine: &FilterEngine<S>) -> Result<()> {
    let available = engine.available_filters();

    if engine.events().is_empty() {
        println!("{}", "No events loaded".dimmed());
        return Ok(());
    }

    for filter in available.iter() {
        println!("{}", filter.render());
    }

    let stale = engine.selected().stale_values(available);
    if !stale.is_empty() {
        println!();
        for value in &stale {
            println!("{}", value.render());
        }
    }

    Ok(())
}
