//! The per-session configuration surface: model, temperature, reasoning.
//!
//! Every knob is a closed enumeration. The gateway identifier is mapped to
//! a vendor family through `ModelFamily` rather than substring tests on the
//! identifier string, so a future model name containing another vendor's
//! substring cannot be misclassified.

use serde::{Deserialize, Serialize};

/// The supported gateway models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "openai/gpt-oss-20b")]
    GptOss20b,
    #[serde(rename = "openai/gpt-oss-120b")]
    GptOss120b,
    #[serde(rename = "meta-llama/llama-4-maverick-17b-128e-instruct")]
    Llama4Maverick,
    #[serde(rename = "meta-llama/llama-4-scout-17b-16e-instruct")]
    Llama4Scout,
    #[serde(rename = "moonshotai/kimi-k2-instruct")]
    KimiK2,
    #[serde(rename = "qwen/qwen3-32b")]
    Qwen3_32b,
}

/// Vendor family a model belongs to, used to pick the base instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    GptOss,
    Llama,
    Kimi,
    Qwen,
}

impl ModelId {
    pub const ALL: [ModelId; 6] = [
        ModelId::GptOss20b,
        ModelId::GptOss120b,
        ModelId::Llama4Maverick,
        ModelId::Llama4Scout,
        ModelId::KimiK2,
        ModelId::Qwen3_32b,
    ];

    /// Identifier sent on the wire to the gateway.
    pub fn wire_id(self) -> &'static str {
        match self {
            ModelId::GptOss20b => "openai/gpt-oss-20b",
            ModelId::GptOss120b => "openai/gpt-oss-120b",
            ModelId::Llama4Maverick => "meta-llama/llama-4-maverick-17b-128e-instruct",
            ModelId::Llama4Scout => "meta-llama/llama-4-scout-17b-16e-instruct",
            ModelId::KimiK2 => "moonshotai/kimi-k2-instruct",
            ModelId::Qwen3_32b => "qwen/qwen3-32b",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::GptOss20b => "GPT-OSS 20B (by OpenAI)",
            ModelId::GptOss120b => "GPT-OSS 120B (by OpenAI)",
            ModelId::Llama4Maverick => "LLaMA 4 Maverick 17B (by Meta AI)",
            ModelId::Llama4Scout => "LLaMA 4 Scout 17B (by Meta AI)",
            ModelId::KimiK2 => "Kimi K2 Instruct (by Moonshot AI)",
            ModelId::Qwen3_32b => "Qwen 3 32B (by Alibaba Group)",
        }
    }

    pub fn family(self) -> ModelFamily {
        match self {
            ModelId::GptOss20b | ModelId::GptOss120b => ModelFamily::GptOss,
            ModelId::Llama4Maverick | ModelId::Llama4Scout => ModelFamily::Llama,
            ModelId::KimiK2 => ModelFamily::Kimi,
            ModelId::Qwen3_32b => ModelFamily::Qwen,
        }
    }

    /// Look up a model by its wire identifier. Unknown identifiers do not
    /// parse; there is no fallback model.
    pub fn parse(wire_id: &str) -> Option<ModelId> {
        ModelId::ALL.into_iter().find(|m| m.wire_id() == wire_id)
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::GptOss20b
    }
}

/// Sampling temperature, restricted to the four supported stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperature {
    #[serde(rename = "0.0")]
    Deterministic,
    #[serde(rename = "0.3")]
    Focused,
    #[serde(rename = "0.7")]
    Balanced,
    #[serde(rename = "1.0")]
    Creative,
}

impl Temperature {
    pub const ALL: [Temperature; 4] = [
        Temperature::Deterministic,
        Temperature::Focused,
        Temperature::Balanced,
        Temperature::Creative,
    ];

    pub fn as_f32(self) -> f32 {
        match self {
            Temperature::Deterministic => 0.0,
            Temperature::Focused => 0.3,
            Temperature::Balanced => 0.7,
            Temperature::Creative => 1.0,
        }
    }

    pub fn parse(value: &str) -> Option<Temperature> {
        match value {
            "0.0" => Some(Temperature::Deterministic),
            "0.3" => Some(Temperature::Focused),
            "0.7" => Some(Temperature::Balanced),
            "1.0" => Some(Temperature::Creative),
            _ => None,
        }
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature::Balanced
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.as_f32())
    }
}

/// Hint controlling how much intermediate deliberation the model performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningLevel {
    Low,
    Medium,
    High,
}

impl ReasoningLevel {
    pub const ALL: [ReasoningLevel; 3] = [
        ReasoningLevel::Low,
        ReasoningLevel::Medium,
        ReasoningLevel::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningLevel::Low => "low",
            ReasoningLevel::Medium => "medium",
            ReasoningLevel::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<ReasoningLevel> {
        match value {
            "low" => Some(ReasoningLevel::Low),
            "medium" => Some(ReasoningLevel::Medium),
            "high" => Some(ReasoningLevel::High),
            _ => None,
        }
    }
}

impl Default for ReasoningLevel {
    fn default() -> Self {
        ReasoningLevel::Medium
    }
}

/// Settings a user can change from the session settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub model: ModelId,
    #[serde(default)]
    pub temperature: Temperature,
    #[serde(default)]
    pub reasoning: ReasoningLevel,
}

impl ChatSettings {
    /// One-line summary used in welcome banners and update notices.
    pub fn summary(&self) -> String {
        format!(
            "{} (temp: {}, reasoning: {})",
            self.model.display_name(),
            self.temperature,
            self.reasoning.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_round_trip() {
        for model in ModelId::ALL {
            assert_eq!(ModelId::parse(model.wire_id()), Some(model));
        }
        assert_eq!(ModelId::parse("openai/gpt-5"), None);
    }

    #[test]
    fn family_is_exact_not_substring() {
        // "moonshotai" contains "ai" but maps only to the Kimi family.
        assert_eq!(ModelId::KimiK2.family(), ModelFamily::Kimi);
        assert_eq!(ModelId::GptOss120b.family(), ModelFamily::GptOss);
        assert_eq!(ModelId::Llama4Scout.family(), ModelFamily::Llama);
    }

    #[test]
    fn temperature_stops() {
        assert_eq!(Temperature::parse("0.3"), Some(Temperature::Focused));
        assert_eq!(Temperature::parse("0.5"), None);
        assert!((Temperature::Creative.as_f32() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn settings_serde_uses_wire_names() {
        let settings = ChatSettings {
            model: ModelId::Qwen3_32b,
            temperature: Temperature::Focused,
            reasoning: ReasoningLevel::High,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("qwen/qwen3-32b"));
        assert!(json.contains("0.3"));
        assert!(json.contains("high"));

        let back: ChatSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
