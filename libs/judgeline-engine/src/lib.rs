pub mod cache;
pub mod engine;
pub mod evaluator;
pub mod executor;
pub mod generator;

#[cfg(test)]
mod test_utils;

pub use cache::{CacheStats, GenerationCache};
pub use engine::{ExecutionBackend, ExecutionRequest, JdoodleEngine};
pub use executor::Harness;
pub use generator::{GeminiGenerator, GenerationBackend};
