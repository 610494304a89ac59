// ABOUTME: Test case generation service integration
// ABOUTME: HTTP client for the external generator and the trait the API layer depends on

pub mod service;

// Re-export service types
pub use service::{
    GenerationClient, GenerationConfig, GenerationError, GenerationResult, TestCaseGenerator,
    DEFAULT_GENERATION_URL,
};
