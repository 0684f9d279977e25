pub mod extractor;
pub mod handlers;
pub mod image;
pub mod prompts;
