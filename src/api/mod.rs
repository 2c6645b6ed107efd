//! OpenAI-compatible streaming types

mod openai;

pub use openai::*;
