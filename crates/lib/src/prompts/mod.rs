//! # Prompt Templates
//!
//! Pure functions that turn collected answers, document text or a user question
//! into the prompts sent to the AI provider. Nothing in here can fail.

pub mod faq;
pub mod keywords;

pub use faq::{build_faq_prompt, faq_options, FAQ_SYSTEM_PROMPT};
pub use keywords::{
    build_keyword_prompt, build_refinement_prompt, keyword_options, sample_lines,
    KEYWORD_SYSTEM_PROMPT,
};
