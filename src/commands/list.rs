use anyhow::Result;
use eventboard_core::sections::group_by_month;
use eventboard_core::{AnalyticsSink, Event, FilterEngine};
use owo_colors::OwoColorize;

use crate::render::{Render, format_date_label};

pub fn run<S: AnalyticsSink>(engine: &FilterEngine<S>, months: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&engine.view())?);
        return Ok(());
    }

    let events = engine.filtered_events();

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    if months {
        print_by_month(&events);
    } else {
        print_by_day(&events);
    }

    for stale in engine.selected().stale_values(engine.available_filters()) {
        println!("{}", stale.render());
    }

    Ok(())
}

fn print_by_month(events: &[Event]) {
    for (i, section) in group_by_month(events).iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} {}", section.label.bold(), format!("#{}", section.id).dimmed());
        for event in &section.events {
            println!("  {}", event.render());
        }
    }
}

fn print_by_day(events: &[Event]) {
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = format_date_label(event.start);

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        println!("  {}", event.render());
    }
}
