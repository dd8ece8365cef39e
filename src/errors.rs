//! Error types with miette diagnostics
//!
//! Geometry and state errors are local: the rejected operation leaves the
//! turtle untouched. `SurfaceUnavailable` is fatal for the device it names.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// Engine Errors
// ============================================================================

/// Errors raised by the vector, device, scheduler and turtle layers
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TurtleError {
    #[error("{operation}: invalid argument: {message}")]
    #[diagnostic(code(turtle_canvas::invalid_argument))]
    InvalidArgument {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: degenerate geometry: {message}")]
    #[diagnostic(code(turtle_canvas::degenerate_geometry))]
    DegenerateGeometry {
        operation: &'static str,
        message: String,
    },

    #[error("drawing surface unavailable: {id}")]
    #[diagnostic(
        code(turtle_canvas::surface_unavailable),
        help("the surface was never provided by the host or its device was torn down")
    )]
    SurfaceUnavailable { id: String },

    #[error("world coordinates of {id} changed while a motion is in flight")]
    #[diagnostic(
        code(turtle_canvas::motion_in_flight),
        help("await every pending motion on this surface before remapping it")
    )]
    MotionInFlight { id: String },
}

impl TurtleError {
    pub fn invalid(operation: &'static str, message: impl Into<String>) -> Self {
        TurtleError::InvalidArgument {
            operation,
            message: message.into(),
        }
    }

    pub fn degenerate(operation: &'static str, message: impl Into<String>) -> Self {
        TurtleError::DegenerateGeometry {
            operation,
            message: message.into(),
        }
    }

    /// Reject NaN and infinities at the boundary.
    pub fn check_finite(operation: &'static str, name: &str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::invalid(operation, format!("{name} must be finite, got {value}")))
        }
    }
}

pub type Result<T, E = TurtleError> = std::result::Result<T, E>;

// ============================================================================
// Script Errors
// ============================================================================

/// Errors from the script front-end, pointing at the offending source
#[derive(Error, Diagnostic, Debug)]
pub enum ScriptError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(turtle_canvas::script::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("invalid number: {text}")]
    #[diagnostic(code(turtle_canvas::script::invalid_number))]
    InvalidNumber {
        text: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("`{call}` failed")]
    #[diagnostic(code(turtle_canvas::script::call_failed))]
    CallFailed {
        call: String,
        #[source]
        #[diagnostic_source]
        cause: TurtleError,
        #[source_code]
        src: NamedSource<String>,
        #[label("while running this call")]
        span: SourceSpan,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_finite_accepts_numbers() {
        assert_eq!(TurtleError::check_finite("forward", "distance", 3.5), Ok(3.5));
    }

    #[test]
    fn check_finite_rejects_nan() {
        let err = TurtleError::check_finite("forward", "distance", f64::NAN).unwrap_err();
        assert!(matches!(err, TurtleError::InvalidArgument { operation: "forward", .. }));
        assert!(err.to_string().contains("distance must be finite"));
    }

    #[test]
    fn surface_unavailable_names_the_surface() {
        let err = TurtleError::SurfaceUnavailable { id: "main".to_string() };
        assert_eq!(err.to_string(), "drawing surface unavailable: main");
    }
}
