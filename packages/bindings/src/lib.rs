use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use roi_engine_core::error::FieldViolation;
use roi_engine_core::{CalculationRequest, EngineConfig, ProfileCatalog, RoiEngine};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn engine(config_json: Option<String>) -> NapiResult<RoiEngine> {
    let config: EngineConfig = match config_json {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str(&json).map_err(to_napi_error)?
        }
        _ => EngineConfig::default(),
    };
    RoiEngine::new(ProfileCatalog::default(), config).map_err(to_napi_error)
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    violations: Vec<FieldViolation>,
    warnings: Vec<String>,
}

/// Full ROI calculation. Returns the result envelope as JSON.
#[napi]
pub fn compute_roi(request_json: String, config_json: Option<String>) -> NapiResult<String> {
    let request: CalculationRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let output = engine(config_json)?
        .compute_with_metadata(&request)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Validate a request without calculating. Violations are data, not errors.
#[napi]
pub fn validate_request(request_json: String) -> NapiResult<String> {
    let request: CalculationRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let report = match engine(None)?.validate(&request) {
        Ok(ctx) => ValidationReport {
            valid: true,
            violations: Vec::new(),
            warnings: ctx.warnings,
        },
        Err(e) => ValidationReport {
            valid: false,
            violations: e.violations,
            warnings: Vec::new(),
        },
    };
    serde_json::to_string(&report).map_err(to_napi_error)
}

/// The built-in profile catalog as JSON.
#[napi]
pub fn profile_catalog() -> NapiResult<String> {
    serde_json::to_string(&ProfileCatalog::default()).map_err(to_napi_error)
}
