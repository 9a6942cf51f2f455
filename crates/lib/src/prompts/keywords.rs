use crate::{
    providers::ai::GenerationOptions,
    session::{CollectedFields, Field},
};
use rand::Rng;

pub const KEYWORD_SYSTEM_PROMPT: &str = "You are an expert in digital marketing.";

/// Placeholders: `{industry}`, `{objective}`, `{website}`, `{social_media}`, `{ppc}`,
/// `{audience}`, `{location}`.
pub const KEYWORD_USER_PROMPT: &str = "Generate a list of trending and relevant keywords for a {industry} business with the following details:
- Objective: {objective}
- Website: {website}
- Social Media: {social_media}
- PPC Campaigns: {ppc}
- Target Audience: {audience}
- Target Location(s): {location}";

/// Placeholders: `{document}`.
pub const REFINEMENT_USER_PROMPT: &str = "Based on the following business document, generate a refined list of trending and relevant marketing keywords. Focus on the products, services, audience and locations the document describes.

# Document
{document}";

const KEYWORD_MAX_TOKENS: u32 = 200;

/// Generation settings for both keyword prompts.
pub fn keyword_options() -> GenerationOptions {
    GenerationOptions::new(KEYWORD_MAX_TOKENS)
}

/// Fills the keyword template, substituting defaults for unanswered fields.
pub fn build_keyword_prompt(fields: &CollectedFields) -> String {
    // Values are substituted in a single pass so an answer containing a
    // placeholder such as "{location}" is not expanded again.
    let mut prompt = String::with_capacity(KEYWORD_USER_PROMPT.len() + 128);
    let mut rest = KEYWORD_USER_PROMPT;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        prompt.push_str(&rest[..start]);
        match Field::ALL.iter().find(|f| f.key() == name) {
            Some(field) => prompt.push_str(fields.value_or_default(*field)),
            None => prompt.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    prompt.push_str(rest);
    prompt
}

/// Embeds the full extracted document text. Earlier answers are not used.
pub fn build_refinement_prompt(document_text: &str) -> String {
    REFINEMENT_USER_PROMPT.replace("{document}", document_text)
}

/// Picks at most `max` non-empty lines at random, keeping their original order.
pub fn sample_lines<'a, R: Rng + ?Sized>(text: &'a str, max: usize, rng: &mut R) -> Vec<&'a str> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() <= max {
        return lines;
    }
    let mut picked = rand::seq::index::sample(rng, lines.len(), max).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| lines[i]).collect()
}
