pub mod gemini;
pub mod memory_store;
pub mod openai;

pub use gemini::GeminiAnalysisAdapter;
pub use memory_store::InMemoryContentStore;
pub use openai::OpenAiAnalysisAdapter;
