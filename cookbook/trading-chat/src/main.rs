//! Multi-profile trading assistant with a settings panel and streaming
//! replies.
//!
//! Pick a profile on the command line (`trading-chat day_trader`); change
//! settings mid-conversation with `/set model <id>`, `/set temp <value>`,
//! or `/set reasoning <level>`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use parley_engine::{
    AppConfig, ChatSession, ChatSettings, GroqClient, ModelId, Persona, ReasoningLevel,
    Temperature,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let profile = std::env::args()
        .nth(1)
        .map(|tag| Persona::parse(&tag))
        .unwrap_or_default();

    let config = AppConfig::from_env();
    let api_key_ok = config.require_api_key();
    if let Err(err) = api_key_ok {
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

    let mut session = ChatSession::new(model, profile, ChatSettings::default());

    println!("{} profile selected. Try one of these starters:", profile.title());
    for starter in profile.starters() {
        println!("  - {}: {}", starter.label, starter.message);
    }
    println!();
    println!("Commands: /set model <id> | /set temp <value> | /set reasoning <level>");
    println!("Type 'quit' or 'exit' to stop\n");

    let streaming = config.model.stream;
    let stdin = io::stdin();
    let mut first_message = true;

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
            println!("Goodbye!");
            break;
        }
        if let Some(rest) = input.strip_prefix("/set ") {
            println!("{}", apply_setting(&mut session, rest));
            continue;
        }

        if first_message {
            println!("{}", session.welcome_banner());
            first_message = false;
        }

        if streaming {
            match session.stream_turn(input).await {
                Ok(mut reply) => {
                    print!("Assistant: ");
                    io::stdout().flush().ok();
                    while let Some(fragment) = reply.next().await {
                        match fragment {
                            Ok(text) => {
                                print!("{text}");
                                io::stdout().flush().ok();
                            }
                            Err(err) => {
                                eprintln!("\nError: {err}");
                                break;
                            }
                        }
                    }
                    println!("\n");
                }
                Err(err) => report_turn_error(err),
            }
        } else {
            match session.complete_turn(input).await {
                Ok(reply) => println!("Assistant: {reply}\n"),
                Err(err) => report_turn_error(err),
            }
        }
    }
}

fn apply_setting<M: parley_engine::LanguageModel>(
    session: &mut ChatSession<M>,
    rest: &str,
) -> String {
    let mut parts = rest.splitn(2, ' ');
    let key = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default().trim();
    let mut settings = *session.settings();

    match key {
        "model" => match ModelId::parse(value) {
            Some(model) => {
                settings.model = model;
                session.update_settings(settings)
            }
            None => format!(
                "Unknown model `{value}`. Options: {}",
                ModelId::ALL
                    .iter()
                    .map(|m| m.wire_id())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        "temp" => match Temperature::parse(value) {
            Some(temperature) => {
                settings.temperature = temperature;
                session.update_settings(settings)
            }
            None => "Unknown temperature. Options: 0.0, 0.3, 0.7, 1.0".to_string(),
        },
        "reasoning" => match ReasoningLevel::parse(value) {
            Some(reasoning) => {
                settings.reasoning = reasoning;
                session.update_settings(settings)
            }
            None => "Unknown reasoning level. Options: low, medium, high".to_string(),
        },
        other => format!("Unknown setting `{other}`. Options: model, temp, reasoning"),
    }
}

fn report_turn_error(err: parley_engine::ParleyError) {
    eprintln!("Error: {err}");
    eprintln!("Please check your API key, model selection, or network connection.\n");
}
