use crate::providers::ai::GenerationOptions;

pub const FAQ_SYSTEM_PROMPT: &str = "You are a digital marketing assistant.";

const FAQ_MAX_TOKENS: u32 = 150;
const FAQ_TEMPERATURE: f32 = 0.7;

pub fn faq_options() -> GenerationOptions {
    GenerationOptions::new(FAQ_MAX_TOKENS).with_temperature(FAQ_TEMPERATURE)
}

/// The question is sent as-is, minus surrounding whitespace.
pub fn build_faq_prompt(question: &str) -> String {
    question.trim().to_string()
}
