use std::path::PathBuf;

/// Failures of the demo's own commands. Mistakes on the command line itself
/// never get this far; argtree reports those before any handler runs.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("remote {0:?} is reserved")]
    ReservedRemote(String),

    #[error("url {0:?} must start with http:// or https://")]
    UnsupportedUrl(String),

    #[error("refusing to build {name:?} into {}, it's the current directory", .out.display())]
    OutputIsWorkingDir { name: String, out: PathBuf },
}
