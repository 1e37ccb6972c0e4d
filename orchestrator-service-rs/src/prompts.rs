// orchestrator-service-rs/src/prompts.rs
// Prompt text for the two model calls: trip extraction and itinerary generation.

use chrono::NaiveDate;
use shared_types_rs::{ToolName, ToolResult, TripIntent, WeatherSource};

pub const NO_WEATHER_DATA: &str = "no weather data";
pub const NO_ATTRACTIONS_DATA: &str = "no attractions data";

pub fn extraction_prompt(request: &str, today: NaiveDate) -> String {
    format!(
        r#"You extract structured travel preferences from user text.
Return ONLY valid JSON (no markdown, no comments, no extra text) with exactly these keys:
origin, destination, start_date, duration_days, budget, interests, party_size

Rules:
- Use null if unknown.
- start_date is YYYY-MM-DD when the user gives a day, otherwise the user's own words (e.g. "next May").
- budget keeps its currency, e.g. "800 EUR".
- interests must be a JSON list of lowercase strings.
- No extra keys.

Today is {today}.
User request: {request}"#
    )
}

/// Itinerary prompt. Every tool the run attempted or skipped is named; a
/// missing tool is marked as unavailable rather than left out.
pub fn itinerary_prompt(intent: &TripIntent, tool_results: &[ToolResult]) -> String {
    let days = intent.duration_days;
    let header = format!(
        r#"You plan day-by-day vacation itineraries.
Return ONLY valid JSON: an array of exactly {days} objects with keys
day_index (1 to {days}, in order), summary (string), activities (list of strings).
Use only the weather and attraction facts listed below. Where data is marked
unavailable, plan without it and do not invent forecasts or places.
"#
    );

    [
        header,
        trip_section(intent),
        weather_section(tool_results),
        attractions_section(tool_results),
    ]
    .join("\n")
}

fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

fn trip_section(intent: &TripIntent) -> String {
    let dates = match (intent.start_date, intent.end_date()) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => "flexible".to_string(),
    };
    let budget = intent
        .budget
        .as_ref()
        .map(|budget| format!("{} {}", budget.amount, budget.currency))
        .unwrap_or_else(|| "not given".to_string());
    let interests = if intent.interests.is_empty() {
        "none given".to_string()
    } else {
        intent.interests.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };

    block(vec![
        "Trip:".to_string(),
        format!("- destination: {}", intent.destination),
        format!("- origin: {}", intent.origin.as_deref().unwrap_or("not given")),
        format!("- dates: {}", dates),
        format!("- duration: {} days", intent.duration_days),
        format!("- budget: {}", budget),
        format!("- travellers: {}", intent.party_size),
        format!("- interests: {}", interests),
    ])
}

fn find(tool_results: &[ToolResult], tool: ToolName) -> Option<&ToolResult> {
    tool_results.iter().find(|r| r.tool == tool)
}

fn weather_section(tool_results: &[ToolResult]) -> String {
    let Some(result) = find(tool_results, ToolName::Weather) else {
        return format!("Weather: {} (not requested)\n", NO_WEATHER_DATA);
    };
    let Some(weather) = result.weather() else {
        let reason = result.error_message().unwrap_or("unavailable");
        return format!("Weather: {} ({})\n", NO_WEATHER_DATA, reason);
    };

    let heading = match weather.source {
        WeatherSource::Forecast => format!("Weather forecast for {}:", weather.location),
        WeatherSource::Seasonal => format!(
            "Typical weather for {} on these dates (observed last year, not a forecast):",
            weather.location
        ),
    };

    let days = weather.days.iter().map(|day| {
        let temperature = match (day.temperature_min_c, day.temperature_max_c) {
            (Some(min), Some(max)) => format!(" {:.0}-{:.0}°C", min, max),
            _ => String::new(),
        };
        let rain = match (day.precipitation_probability, day.precipitation_mm) {
            (Some(probability), _) => format!(", rain chance {}%", probability),
            (None, Some(mm)) => format!(", rain {:.1} mm", mm),
            (None, None) => String::new(),
        };
        format!("- {}:{}{}", day.date, temperature, rain)
    });

    block(std::iter::once(heading).chain(days).collect())
}

fn attractions_section(tool_results: &[ToolResult]) -> String {
    let Some(result) = find(tool_results, ToolName::Attractions) else {
        return format!("Attractions: {} (not requested)\n", NO_ATTRACTIONS_DATA);
    };
    let Some(attractions) = result.attractions() else {
        let reason = result.error_message().unwrap_or("unavailable");
        return format!("Attractions: {} ({})\n", NO_ATTRACTIONS_DATA, reason);
    };

    let entries = attractions.attractions.iter().map(|attraction| match &attraction.description {
        Some(description) => format!("- {} ({}): {}", attraction.name, attraction.category, description),
        None => format!("- {} ({})", attraction.name, attraction.category),
    });

    block(
        std::iter::once(format!("Attractions in {}:", attractions.destination))
            .chain(entries)
            .collect(),
    )
}
