//! Scene error type.
//!
//! The decorative layer never fails loudly: the browser entry point turns
//! these into a log line and skips mounting.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No element with the requested id, or it is not a `<canvas>`.
    CanvasMissing {
        /// Element id that was looked up.
        id: String,
    },

    /// The canvas refused a WebGL2 context.
    ContextUnavailable,

    /// A browser API call threw.
    Dom(String),

    /// Shader compile or program link failure, with the driver's log.
    Shader(String),

    /// A stored preference string that is neither `dark` nor `light`.
    UnknownTheme(String),

    /// The embedded scene configuration could not be parsed.
    Config(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::CanvasMissing { id } => write!(f, "canvas #{id} not found"),
            SceneError::ContextUnavailable => f.write_str("WebGL2 not supported"),
            SceneError::Dom(msg) => write!(f, "browser call failed: {msg}"),
            SceneError::Shader(log) => write!(f, "shader error: {log}"),
            SceneError::UnknownTheme(value) => write!(f, "unknown theme {value:?}"),
            SceneError::Config(msg) => write!(f, "invalid scene config: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {}
