pub mod generator;
pub mod openai;
pub mod prompt;

pub use generator::{GenerationError, MockTextGenerator, TextGenerator};
pub use openai::OpenAiCompatClient;
