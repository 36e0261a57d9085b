//! Web-search agent.
//!
//! Uses Tavily when `TAVILY_API_KEY` is configured, DuckDuckGo (no key)
//! otherwise. The agent searches, synthesizes, and answers; the dispatch
//! loop is bounded so a confused model cannot search forever.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use parley_engine::tools::{duckduckgo_toolkit, tavily_toolkit, DuckDuckGoConfig, TavilyConfig};
use parley_engine::{
    prompt, Agent, AppConfig, ChatSettings, GroqClient, ModelId, ParleyError, Temperature,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

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

    let (tools, tool_name, provider) = match &config.search.tavily_api_key {
        Some(key) => (
            tavily_toolkit(
                TavilyConfig::new(key.clone()).with_max_results(config.search.max_results),
            ),
            "tavily_search",
            "Tavily",
        ),
        None => (
            duckduckgo_toolkit(DuckDuckGoConfig {
                max_results: config.search.max_results,
                ..DuckDuckGoConfig::default()
            }),
            "duckduckgo_search",
            "DuckDuckGo",
        ),
    };

    // Low temperature keeps the search reasoning focused.
    let settings = ChatSettings {
        model: ModelId::Llama4Scout,
        temperature: Temperature::Deterministic,
        ..ChatSettings::default()
    };

    let mut agent = Agent::new(model)
        .with_system_prompt(prompt::search_agent_instruction(tool_name))
        .with_tools(tools)
        .with_settings(settings);

    println!("Search Agent powered by {} + {provider}", settings.model.display_name());
    println!("Ask me anything - I can search the web for current information!");
    println!("Type 'quit' or 'exit' to stop\n");

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
            println!("Goodbye! Happy researching!");
            break;
        }

        println!("\n[AGENT] Processing your search request...");

        match agent.respond(input).await {
            Ok(reply) => println!("\nAgent: {reply}\n"),
            Err(ParleyError::ServiceUnavailable(detail)) => {
                eprintln!("\n[ERROR] The model gateway is currently unavailable. Please try again later.");
                eprintln!("        ({detail})\n");
            }
            Err(ParleyError::RateLimited(detail)) => {
                eprintln!("\n[ERROR] Rate limited. Try again in a moment. ({detail})\n");
            }
            Err(ParleyError::StepLimit(steps)) => {
                eprintln!("\n[ERROR] Stopped after {steps} search steps without a final answer.");
                eprintln!("        Try rephrasing the question.\n");
            }
            Err(err) => {
                eprintln!("\n[ERROR] {err}");
                eprintln!("        Please try again or check your API keys.\n");
            }
        }
    }
}
