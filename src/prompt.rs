//! Prompt assembly: system instruction, bounded history, new user message.

use crate::message::Message;
use crate::persona::Persona;
use crate::settings::{ChatSettings, ModelFamily};

/// Base instruction for a model family. The family is resolved from the
/// enumerated `ModelId`, never from substring checks on the identifier.
fn base_instruction(settings: &ChatSettings) -> String {
    let name = settings.model.display_name();
    let level = settings.reasoning.as_str();
    match settings.model.family() {
        ModelFamily::Llama => format!(
            "You are a powerful multimodal assistant powered by {name}. Developed by \
             Meta AI, you are optimized for reasoning, structured responses, and visual \
             comprehension. Use {level} reasoning. Be structured, concise, and capable \
             across multiple tasks."
        ),
        ModelFamily::GptOss => format!(
            "You are a helpful AI assistant powered by {name}. Created by OpenAI, you \
             operate under open weights and excel in flexible, high-performance \
             reasoning. Your reasoning should be {level}. Respond clearly, creatively, \
             and responsibly."
        ),
        ModelFamily::Kimi => format!(
            "You are a thoughtful, autonomous assistant running on {name}. Developed by \
             Moonshot AI, you specialize in long-context understanding, advanced tool \
             use, and deep reasoning. Use {level} reasoning and provide insightful, \
             deliberate answers."
        ),
        ModelFamily::Qwen => format!(
            "You are a multilingual and versatile assistant powered by {name}. Developed \
             by Alibaba Group, you excel in deep reasoning, fast mode-switching, and \
             global communication. Use {level} level of reasoning. Be accurate, helpful, \
             and language-aware."
        ),
    }
}

/// Full system instruction for a profile under the given settings.
pub fn system_instruction(persona: Persona, settings: &ChatSettings) -> String {
    let mut text = base_instruction(settings);
    text.push_str(persona.context());
    text
}

/// Compose the message list for one turn: system instruction, the bounded
/// history window, then the new user message. The caller passes history
/// already truncated by the session's memory window.
pub fn assemble(
    persona: Persona,
    settings: &ChatSettings,
    history: &[Message],
    user_input: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_instruction(persona, settings)));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(user_input));
    messages
}

/// System prompt for the search-agent demos: instructs the model to search,
/// synthesize, and stop rather than looping on the tool.
pub fn search_agent_instruction(tool_name: &str) -> String {
    format!(
        "You are a helpful research assistant that can search the web for information.\n\
         \n\
         Your task:\n\
         1. When users ask questions, search for relevant information using the \
         {tool_name} tool\n\
         2. After getting search results, analyze and synthesize the information\n\
         3. Provide a clear, comprehensive answer based on the search results\n\
         4. Always provide a final response - do not keep searching endlessly\n\
         \n\
         Important guidelines:\n\
         - Use the search tool when you need current information\n\
         - After 1-2 searches, provide your answer based on the results you have\n\
         - If search results are poor quality, acknowledge this but still provide a \
         response\n\
         - Be concise and helpful in your final answers\n\
         - Stop searching once you have enough information to answer the question\n\
         \n\
         Remember: Your goal is to provide helpful answers, not to perform perfect \
         searches."
    )
}

/// System prompt for the weather-agent demo.
pub fn weather_agent_instruction() -> &'static str {
    "You are a helpful weather assistant.\n\
     \n\
     You have access to weather tools that can provide current weather and forecasts \
     for any city worldwide. When users ask about weather, use the appropriate tools \
     to get the information.\n\
     \n\
     Key capabilities:\n\
     - Get current weather conditions for any city\n\
     - Provide weather forecasts for up to 7 days\n\
     - Answer general questions about weather patterns\n\
     - Give weather-related advice\n\
     \n\
     Always be friendly, informative, and mention that the weather data is simulated \
     for demonstration purposes. If users ask about non-weather topics, politely \
     redirect them back to weather-related questions or provide general assistance."
}
