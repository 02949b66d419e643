use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown abscissa '{0}'")]
    UnknownAbscissa(String),

    #[error("Abscissa '{0}' appears more than once")]
    DuplicateAbscissa(String),

    #[error("Target abscissa '{0}' collides with an untouched abscissa")]
    AbscissaCollision(String),

    #[error("Edges of abscissa '{name}' are not strictly increasing at index {index}")]
    NonMonotonicEdges { name: String, index: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Transform undefined at {target:?} = {point:?}: {source}")]
    Domain {
        target: [String; 2],
        point: [f64; 2],
        source: Box<DistError>,
    },

    #[error("{target:?} = {point:?} maps to {mapped:?}, outside the source grid")]
    OutOfBounds {
        target: [String; 2],
        point: [f64; 2],
        mapped: [f64; 2],
    },

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl DistError {
    /// True for errors caused by a malformed density or transform
    /// description, raised before any array work starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DistError::ConfigError(_)
                | DistError::UnknownAbscissa(_)
                | DistError::DuplicateAbscissa(_)
                | DistError::AbscissaCollision(_)
                | DistError::NonMonotonicEdges { .. }
                | DistError::ShapeMismatch(_)
        )
    }
}

pub type DistResult<T> = Result<T, DistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_classification() {
        assert!(DistError::AbscissaCollision("E".into()).is_config_error());
        assert!(DistError::NonMonotonicEdges {
            name: "xi".into(),
            index: 2
        }
        .is_config_error());
        assert!(!DistError::PhysicsViolation("bad".into()).is_config_error());
    }

    #[test]
    fn test_domain_message_carries_point() {
        let err = DistError::Domain {
            target: ["E".into(), "xi".into()],
            point: [0.0, 1.0],
            source: Box::new(DistError::PhysicsViolation("singular pitch".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("[\"E\", \"xi\"] = [0.0, 1.0]"), "{msg}");
        assert!(msg.contains("singular pitch"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
