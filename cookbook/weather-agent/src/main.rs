//! Simulated weather agent.
//!
//! Modes:
//! - no argument: interactive loop
//! - `demo`: run a fixed set of queries
//! - `verbose`: interactive loop with tool-dispatch tracing enabled

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use parley_engine::tools::weather_toolkit;
use parley_engine::{prompt, Agent, AppConfig, ChatSettings, GroqClient, Temperature};

const DEMO_QUERIES: [&str; 4] = [
    "What's the weather like in San Francisco?",
    "Can you give me a 5-day forecast for Tokyo?",
    "How's the weather in London today?",
    "What about the forecast for New York this week?",
];

#[tokio::main]
async fn main() {
    let mode = std::env::args().nth(1).unwrap_or_default();

    let filter = if mode == "verbose" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parley_engine=debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match mode.as_str() {
        "" | "verbose" => run_interactive(mode == "verbose").await,
        "demo" => run_demo().await,
        _ => {
            println!("Usage: weather-agent [demo|verbose]");
            println!("  demo    - Run predefined demo queries");
            println!("  verbose - Interactive mode with tool-dispatch tracing");
            println!("  (no args) - Standard interactive mode");
        }
    }
}

fn build_agent() -> Agent<GroqClient> {
    let config = AppConfig::from_env();
    if let Err(err) = config.require_api_key() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let model = match GroqClient::from_config(&config.model) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    // Conservative temperature keeps tool use consistent.
    let settings = ChatSettings {
        temperature: Temperature::Deterministic,
        ..ChatSettings::default()
    };

    Agent::new(model)
        .with_system_prompt(prompt::weather_agent_instruction())
        .with_tools(weather_toolkit())
        .with_settings(settings)
}

async fn run_interactive(verbose: bool) {
    println!("Weather Agent (simulated data)");
    if verbose {
        println!("Tool dispatch tracing is on");
    }
    println!("Ask me about weather in any city!");
    println!("Type 'quit' or 'exit' to stop\n");

    let mut agent = build_agent();
    let stdin = io::stdin();

    loop {
        print!("You: ");
        io::stdout().flush().ok();

        let Some(Ok(line)) = stdin.lock().lines().next() else {
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input, "quit" | "exit" | "q") {
            println!("Goodbye! Stay weather-aware!");
            break;
        }

        println!("\n[AGENT] Processing your request...");

        match agent.respond(input).await {
            Ok(reply) => println!("\nAgent: {reply}\n"),
            Err(err) => {
                eprintln!("Error: {err}");
                eprintln!("Please try again.\n");
            }
        }
    }
}

async fn run_demo() {
    println!("Weather Agent Demo");
    println!("{}", "=".repeat(50));

    let mut agent = build_agent();

    for query in DEMO_QUERIES {
        println!("\nUser: {query}");
        println!("[AGENT] Processing request...");

        match agent.respond(query).await {
            Ok(reply) => println!("\nAgent: {reply}"),
            Err(err) => eprintln!("Error: {err}"),
        }
    }
}
