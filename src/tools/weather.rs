//! Simulated weather tools.
//!
//! Not a real external call: conditions come from a generator seeded by
//! the city name, so the same city always reports the same weather. A few
//! city sets get climate-appropriate ranges; every report says the data
//! is simulated.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ParleyError, Result};
use crate::tool::{Tool, ToolRegistry};

const CONDITIONS: &[&str] = &[
    "sunny",
    "partly cloudy",
    "cloudy",
    "light rain",
    "heavy rain",
    "snow",
    "foggy",
    "windy",
];

const DESERT_CITIES: &[&str] = &["phoenix", "las vegas", "dubai"];
const MARITIME_CITIES: &[&str] = &["seattle", "london", "vancouver"];
const SUBARCTIC_CITIES: &[&str] = &["moscow", "helsinki", "anchorage"];

/// Create a registry with the current-weather and forecast tools.
pub fn weather_toolkit() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(GetWeatherTool);
    registry.register(GetWeatherForecastTool);
    registry
}

fn seeded_rng(key: &str) -> StdRng {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}

struct GetWeatherTool;

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather information for a given city. Expects {\"city\": string}."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "The name of the city to get weather for"}
            },
            "required": ["city"]
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let city = input
            .get("city")
            .and_then(Value::as_str)
            .ok_or_else(|| ParleyError::Protocol("missing `city` for get_weather".into()))?;

        info!(%city, "simulated weather lookup");
        Ok(Value::String(current_weather_report(city)))
    }
}

struct GetWeatherForecastTool;

#[async_trait]
impl Tool for GetWeatherForecastTool {
    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Get a weather forecast for a given city. Expects {\"city\": string, \"days\": number 1-7 (optional, default 3)}."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "The name of the city to get the forecast for"},
                "days": {"type": "integer", "description": "Number of days to forecast (1-7, default 3)"}
            },
            "required": ["city"]
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let city = input
            .get("city")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ParleyError::Protocol("missing `city` for get_weather_forecast".into())
            })?;

        let days = input
            .get("days")
            .and_then(Value::as_i64)
            .unwrap_or(3)
            .clamp(1, 7) as usize;

        info!(%city, days, "simulated forecast lookup");
        Ok(Value::String(forecast_report(city, days)))
    }
}

/// Deterministic current conditions for a city.
pub fn current_weather_report(city: &str) -> String {
    let city_lower = city.to_lowercase();
    let mut rng = seeded_rng(&city_lower);

    // Baseline values first so every city consumes the generator the same way.
    let mut temperature = rng.gen_range(-10..=35);
    let mut humidity = rng.gen_range(30..=90);
    let mut condition = CONDITIONS[rng.gen_range(0..CONDITIONS.len())];
    let wind_speed = rng.gen_range(5..=25);

    if city_lower.contains("desert") || DESERT_CITIES.contains(&city_lower.as_str()) {
        temperature = rng.gen_range(25..=45);
        humidity = rng.gen_range(10..=30);
        condition = ["sunny", "partly cloudy", "windy"][rng.gen_range(0..3)];
    } else if MARITIME_CITIES.contains(&city_lower.as_str()) {
        temperature = rng.gen_range(5..=20);
        humidity = rng.gen_range(60..=90);
        condition = ["cloudy", "light rain", "heavy rain", "foggy"][rng.gen_range(0..4)];
    } else if SUBARCTIC_CITIES.contains(&city_lower.as_str()) {
        temperature = rng.gen_range(-20..=10);
        condition = ["snow", "cloudy", "foggy"][rng.gen_range(0..3)];
    }

    format!(
        "Current weather in {city}:\n\
         Temperature: {temperature}°C\n\
         Humidity: {humidity}%\n\
         Conditions: {condition}\n\
         Wind Speed: {wind_speed} km/h\n\
         Location: {city}\n\
         \n\
         Weather data simulated for demonstration purposes."
    )
}

/// Deterministic multi-day forecast for a city.
pub fn forecast_report(city: &str, days: usize) -> String {
    let days = days.clamp(1, 7);
    let mut rng = seeded_rng(&format!("{}/forecast", city.to_lowercase()));

    let mut forecast = format!("Weather forecast for {city} - Next {days} days:\n\n");

    const DAY_NAMES: [&str; 7] = [
        "Today", "Tomorrow", "Day 3", "Day 4", "Day 5", "Day 6", "Day 7",
    ];

    for day in 0..days {
        let temp_high = rng.gen_range(15..=30);
        let temp_low = rng.gen_range(5..temp_high - 4);
        let condition = CONDITIONS[rng.gen_range(0..7)];
        let rain_chance = rng.gen_range(0..=100);

        forecast.push_str(&format!("{}: {}\n", DAY_NAMES[day], title_case(condition)));
        forecast.push_str(&format!(
            "   High: {temp_high}°C, Low: {temp_low}°C\n"
        ));
        forecast.push_str(&format!("   Rain chance: {rain_chance}%\n\n"));
    }

    forecast.push_str("Forecast data simulated for demonstration purposes.");
    forecast
}

fn title_case(condition: &str) -> String {
    condition
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_value(report: &str, field: &str) -> i64 {
        report
            .lines()
            .find(|l| l.starts_with(field))
            .and_then(|l| {
                l.trim_start_matches(field)
                    .trim()
                    .trim_end_matches(['°', 'C', '%'])
                    .parse::<i64>()
                    .ok()
            })
            .unwrap_or_else(|| panic!("field {field} missing in report:\n{report}"))
    }

    #[test]
    fn reports_are_deterministic_per_city() {
        assert_eq!(
            current_weather_report("Tokyo"),
            current_weather_report("Tokyo")
        );
        assert_ne!(
            current_weather_report("Tokyo"),
            current_weather_report("Osaka")
        );
    }

    #[test]
    fn desert_city_ranges() {
        let report = current_weather_report("Phoenix");
        let temperature = field_value(&report, "Temperature:");
        let humidity = field_value(&report, "Humidity:");
        assert!((25..=45).contains(&temperature), "temp {temperature} out of range");
        assert!((10..=30).contains(&humidity), "humidity {humidity} out of range");
        assert!(report.contains("simulated"));
    }

    #[test]
    fn subarctic_city_ranges() {
        let report = current_weather_report("Moscow");
        let temperature = field_value(&report, "Temperature:");
        assert!((-20..=10).contains(&temperature));
    }

    #[test]
    fn forecast_clamps_days_and_stays_ordered() {
        let report = forecast_report("Tokyo", 99);
        assert!(report.contains("Next 7 days"));
        assert!(report.contains("Day 7"));
        assert!(report.contains("Forecast data simulated"));

        let one_day = forecast_report("Tokyo", 0);
        assert!(one_day.contains("Next 1 days"));
        assert!(one_day.contains("Today"));
        assert!(!one_day.contains("Tomorrow"));
    }

    #[test]
    fn forecast_low_stays_below_high() {
        for city in ["Tokyo", "Lima", "Cairo", "Oslo"] {
            let report = forecast_report(city, 7);
            for line in report.lines().filter(|l| l.contains("High:")) {
                let high: i64 = line
                    .split("High: ")
                    .nth(1)
                    .and_then(|s| s.split("°C").next())
                    .unwrap()
                    .parse()
                    .unwrap();
                let low: i64 = line
                    .split("Low: ")
                    .nth(1)
                    .and_then(|s| s.split("°C").next())
                    .unwrap()
                    .parse()
                    .unwrap();
                assert!(low < high, "low {low} not below high {high} for {city}");
            }
        }
    }

    #[tokio::test]
    async fn toolkit_registers_both_tools() {
        let registry = weather_toolkit();
        assert!(registry.contains("get_weather"));
        assert!(registry.contains("get_weather_forecast"));

        let result = registry
            .call("get_weather", json!({"city": "Phoenix"}))
            .await
            .unwrap();
        match result {
            Value::String(text) => assert!(text.contains("Phoenix")),
            other => panic!("expected formatted text, got {other}"),
        }
    }
}
