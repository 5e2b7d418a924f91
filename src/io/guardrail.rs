//! Read guardrail JSON files.
//!
//! The guardrail is the single source of truth for canonical parameter values
//! shared across runs. The schema is defined by `domain::Guardrail`.

use std::fs::File;
use std::path::Path;

use crate::domain::Guardrail;
use crate::error::AppError;

/// Default guardrail location, relative to the working directory.
pub const DEFAULT_GUARDRAIL_PATH: &str = "theory/guardrail.json";

/// Read a guardrail JSON file.
pub fn read_guardrail_json(path: &Path) -> Result<Guardrail, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("Guardrail file '{}' not found.", path.display()),
        ));
    }
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open guardrail JSON '{}': {e}", path.display())))?;
    let guardrail: Guardrail = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid guardrail JSON '{}': {e}", path.display())))?;
    tracing::debug!(path = %path.display(), ?guardrail, "guardrail loaded");
    Ok(guardrail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_full_guardrail() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"H0": 68.0, "rs_proxy_Mpc": 148.5, "mapping": "px1", "z_switch": 2.0, "z_star": 1089.8}}"#
        )
        .unwrap();

        let g = read_guardrail_json(file.path()).unwrap();
        assert_eq!(g.h0, 68.0);
        assert_eq!(g.rs_proxy_mpc, 148.5);
        assert_eq!(g.z_star, 1089.8);
        assert!(g.extra.is_empty());
    }

    #[test]
    fn missing_file_is_a_clear_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_guardrail_json(&dir.path().join("guardrail.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"H0\": \"fast\"}}").unwrap();
        let err = read_guardrail_json(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid guardrail JSON"));
    }
}
