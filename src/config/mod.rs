pub mod generation;
pub mod runtime;

pub use generation::GenerationParams;
pub use runtime::RuntimeConfig;
