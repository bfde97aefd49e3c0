use std::fmt;
use std::io;

#[derive(Debug)]
pub enum RunError {
    /// The OS refused to start the executable.
    Spawn {
        executable: String,
        source: io::Error,
    },
    /// The child wrote to its error stream; carries that text verbatim.
    ChildReported(String),
    /// The child exited unsuccessfully without using its error stream.
    /// Only produced under [`crate::ExitPolicy::RequireSuccess`].
    ExitStatus { code: Option<i32> },
    Io(String),
}

impl RunError {
    pub fn is_child_reported(&self) -> bool {
        matches!(self, Self::ChildReported(_))
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { executable, source } => {
                write!(f, "Failed to spawn '{executable}': {source}")
            }
            Self::ChildReported(msg) => write!(f, "{msg}"),
            Self::ExitStatus { code: Some(code) } => {
                write!(f, "Process exited with status {code}")
            }
            Self::ExitStatus { code: None } => write!(f, "Process terminated by signal"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
