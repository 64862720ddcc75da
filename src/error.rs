use thiserror::Error;

/// Top-level error type for the vecpath kernel.
#[derive(Debug, Error)]
pub enum VecpathError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Stroke(#[from] StrokeError),
}

/// Errors raised while parsing SVG path data.
///
/// Positions are 1-based byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("bad path: path should start with command")]
    MissingCommand,

    #[error("bad path: unknown command '{command}' at position {position}")]
    UnknownCommand { command: char, position: usize },

    #[error("bad path: sets of {count} numbers should follow command '{command}' at position {position}")]
    ArgumentCount {
        count: usize,
        command: char,
        position: usize,
    },

    #[error("bad path: number should follow command '{command}' at position {position}")]
    MissingNumber { command: char, position: usize },

    #[error("bad path: largeArc and sweep flags should be 0 or 1 in command '{command}' at position {position}")]
    ArcFlag { command: char, position: usize },
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("unsupported intersection for {first}-{second}")]
    UnsupportedIntersection {
        first: &'static str,
        second: &'static str,
    },

    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to stroking and offsetting.
#[derive(Debug, Error)]
pub enum StrokeError {
    #[error("invalid stroke parameters: {0}")]
    InvalidParameters(String),

    #[error("stroke failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`VecpathError`].
pub type Result<T> = std::result::Result<T, VecpathError>;
