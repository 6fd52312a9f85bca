// Learning-profile analysis: rubric, profile, talent and wellbeing stages.
// All LLM calls go through llm_client; this module never talks to a provider directly.

pub mod fallbacks;
pub mod handlers;
pub mod longitudinal;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod screening;
