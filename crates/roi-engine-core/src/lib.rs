pub mod cashflow;
pub mod catalog;
pub mod config;
pub mod cost_model;
pub mod currency;
pub mod dcf;
pub mod engine;
pub mod error;
pub mod insights;
pub mod monte_carlo;
pub mod planning;
pub mod resolver;
pub mod result;
pub mod risk;
pub mod scenarios;
pub mod sensitivity;
pub mod types;

pub use catalog::ProfileCatalog;
pub use config::{EngineConfig, SimulationMode};
pub use engine::RoiEngine;
pub use error::{CalculationError, EngineError, ValidationError};
pub use resolver::CalculationRequest;
pub use result::CalculationResult;
pub use types::*;

/// Standard result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
