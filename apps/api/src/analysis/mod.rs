// Essay analysis: input validation, prompt + schema contract, model call,
// and the supplementary summary flows.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod analyzer;
pub mod example;
#[cfg(test)]
pub mod fixtures;
pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod summaries;
pub mod validation;
