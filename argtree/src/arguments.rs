use std::{
    ffi::{OsStr, OsString},
    path::Path,
};

/// Helper type for loading arguments from the environment. Usually
/// [`Cli::run_env`][crate::Cli::run_env] is all you need.
///
/// This type exists to provide a convenient owned container for args
/// retrieved from [`std::env`], split into the program name and the
/// arguments a [`Cli`][crate::Cli] runs.
#[derive(Debug, Clone, Default)]
pub struct LoadedArguments {
    arguments: Vec<OsString>,
}

impl LoadedArguments {
    pub fn from_env() -> Self {
        Self::new(std::env::args_os())
    }

    /// Load a complete argument list, program name first
    pub fn new(arguments: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn argv0(&self) -> Option<&OsStr> {
        self.arguments.first().map(OsString::as_os_str)
    }

    /// The file name of `argv0`, for usage messages
    #[must_use]
    pub fn program_name(&self) -> Option<String> {
        let argv0 = Path::new(self.argv0()?);
        let name = argv0.file_name().unwrap_or(argv0.as_os_str());

        Some(name.to_string_lossy().into_owned())
    }

    /// Every argument after the program name
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        self.arguments.get(1..).unwrap_or(&[])
    }
}
