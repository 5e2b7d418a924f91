use thiserror::Error;

/// Failures raised by the PX1 model core.
///
/// Degenerate numeric points (infinite `E`, zero `H`) are not errors; they are
/// encoded as sentinel values by the model. Everything here aborts the current
/// observable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Redshift outside the model's domain (negative or non-finite).
    #[error("redshift must be finite and >= 0, got z={z}")]
    Domain { z: f64 },

    /// No sign change of the inversion residual on any candidate bracket.
    #[error("cannot bracket w_emit for z={z}: g(a)={g_lower}, g(b)={g_upper}")]
    RootBracketing { z: f64, g_lower: f64, g_upper: f64 },

    /// The root refinement ran out of iterations.
    #[error("w_emit did not converge for z={z} after {iterations} iterations")]
    RootConvergence { z: f64, iterations: usize },

    /// A model parameter failed validation.
    #[error("invalid parameter {name}={value} (must be finite and > 0)")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Only the PX1 redshift mapping is implemented.
    #[error("unsupported redshift mapping '{0}' (supported: px1)")]
    UnsupportedMapping(String),
}

/// Application-level error carrying a process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(4, format!("Model evaluation failed: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_exit_code_four() {
        let err: AppError = ModelError::Domain { z: -0.5 }.into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("z=-0.5"));
    }

    #[test]
    fn bracketing_message_names_z_and_endpoints() {
        let msg = ModelError::RootBracketing {
            z: 3.0,
            g_lower: 1.0,
            g_upper: 2.0,
        }
        .to_string();
        assert!(msg.contains("z=3"));
        assert!(msg.contains("g(a)=1"));
        assert!(msg.contains("g(b)=2"));
    }
}
