use std::io;
use std::path::PathBuf;

use crate::stage::Target;

/// fatal errors, surfaced from `main`
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// the terminal could not be set up, drawn or restored
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// why a journey (or any other paced task) stopped before its script ended.
/// neither variant is shown to the user; the task just stops writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Halt {
    /// restart/home fired while the task was suspended
    #[error("cancelled")]
    Cancelled,

    /// another reveal already owns this target
    #[error("{0} is already being revealed")]
    Busy(Target),
}
