//! Loading vessel calls from JSON fixture files.

use std::path::Path;

use port_ops_vessel_models::VesselCall;

use crate::DbError;

/// Parses a JSON array of calls, dropping calls whose timestamps are out of
/// order.
///
/// # Errors
///
/// Returns [`DbError::Json`] if the document is not an array of calls.
pub fn parse_calls(json: &str) -> Result<Vec<VesselCall>, DbError> {
    let calls: Vec<VesselCall> = serde_json::from_str(json)?;
    let total = calls.len();

    let valid: Vec<VesselCall> = calls
        .into_iter()
        .filter(|call| match call.validate_timeline() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping vessel call {}: {e}", call.vessel_id);
                false
            }
        })
        .collect();

    if valid.len() < total {
        log::warn!(
            "Dropped {} of {total} vessel calls with inconsistent timelines",
            total - valid.len()
        );
    }

    Ok(valid)
}

/// Reads and parses a fixture file.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be read or parsed.
pub fn load_fixture(path: &Path) -> Result<Vec<VesselCall>, DbError> {
    let json = std::fs::read_to_string(path)?;
    let calls = parse_calls(&json)?;
    log::info!("Loaded {} vessel calls from {}", calls.len(), path.display());
    Ok(calls)
}
