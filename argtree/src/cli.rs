/*!
The [`Cli`] facade: build a command tree from declarations once, then run
any number of command lines against it.
 */

use std::{
    ffi::{OsStr, OsString},
    io, ptr,
};

use tracing::debug;

use crate::{
    arguments::LoadedArguments,
    dispatch::dispatch,
    entry::{EntryPoint, EntryPointDecl, Invocation},
    errors::{ArgumentError, ArgumentErrors, DeclarationError},
    help,
    options::{ArityTable, OptionRegistry, OptionSetDecl},
    resolve::{Resolution, resolve},
    tree::{CommandPath, CommandTree},
    util,
};

/// Help formatting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Argument and option labels are padded to at most this many columns;
    /// wider labels get a line of their own
    pub max_label_width: usize,

    /// Descriptions wrap at this column
    pub wrap_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_label_width: 35,
            wrap_width: 80,
        }
    }
}

/**
Anything that can supply declarations: a static table, generated code, a
plugin. The [`Cli`] doesn't care how they were discovered.
 */
pub trait DeclarationSource {
    fn option_sets(&self) -> Vec<OptionSetDecl> {
        Vec::new()
    }

    fn entry_points(&self) -> Vec<EntryPointDecl>;
}

/// What happened to a command line.
#[derive(Debug)]
#[must_use]
pub enum Outcome {
    /// An entry point's handler ran and succeeded
    Invoked,

    /// Help or usage was printed instead of running anything
    Help,

    /// The command line had problems, which were printed
    Rejected(ArgumentErrors),
}

/// Collects declarations for a [`Cli`]. Nothing is validated until
/// [`build`][CliBuilder::build], so declarations can be given in any order.
#[derive(Debug)]
#[must_use]
pub struct CliBuilder {
    program: String,
    doc: String,
    settings: Settings,
    option_sets: Vec<OptionSetDecl>,
    entry_points: Vec<EntryPointDecl>,
}

impl CliBuilder {
    /// Program-level documentation, printed at the top of the root help
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn option_set(mut self, decl: OptionSetDecl) -> Self {
        self.option_sets.push(decl);
        self
    }

    pub fn entry_point(mut self, decl: EntryPointDecl) -> Self {
        self.entry_points.push(decl);
        self
    }

    /// Add everything a declaration source supplies
    pub fn source(mut self, source: &impl DeclarationSource) -> Self {
        self.option_sets.extend(source.option_sets());
        self.entry_points.extend(source.entry_points());
        self
    }

    pub fn build(self) -> Result<Cli, DeclarationError> {
        let mut registry = OptionRegistry::new();
        self.option_sets
            .into_iter()
            .try_for_each(|decl| registry.declare(decl))?;
        registry.build_all()?;

        let mut arity = ArityTable::new();
        let mut tree = CommandTree::new();

        for decl in self.entry_points {
            let path = CommandPath::parse(&decl.path)?;
            let options = decl
                .options
                .as_deref()
                .map(|name| registry.build(name))
                .transpose()?;

            if let Some(set) = &options {
                arity.register(set)?;
            }

            tree.declare(EntryPoint::build(decl, path, options)?)?;
        }

        if tree.is_empty() {
            return Err(DeclarationError::NoEntryPoints);
        }

        debug!(
            program = %self.program,
            entry_points = tree.len(),
            "built command line interface"
        );

        Ok(Cli {
            program: self.program,
            doc: self.doc,
            settings: self.settings,
            tree,
            arity,
        })
    }
}

/// A built command line interface. Immutable; every run gets its own
/// scratch state, so one `Cli` can serve concurrent runs.
#[derive(Debug)]
pub struct Cli {
    program: String,
    doc: String,
    settings: Settings,
    tree: CommandTree,
    arity: ArityTable,
}

impl Cli {
    pub fn builder(program: impl Into<String>) -> CliBuilder {
        CliBuilder {
            program: program.into(),
            doc: String::new(),
            settings: Settings::default(),
            option_sets: Vec::new(),
            entry_points: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    #[must_use]
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Split a command line into path, flags, and positionals. See
    /// [`resolve`][crate::resolve::resolve].
    pub fn resolve<S: AsRef<OsStr>>(&self, args: &[S]) -> Resolution<'_> {
        resolve(&self.tree, &self.arity, args)
    }

    /// The usage that accompanies errors for this resolution: the usage of
    /// the entry point, or of the branch where resolution stopped (or first
    /// went wrong).
    #[must_use]
    pub fn usage(&self, resolution: &Resolution<'_>) -> String {
        match (resolution.node().entry_point(), resolution.unknown_at()) {
            (Some(entry), None) => help::entry_usage(&self.program, entry).to_string(),
            (_, unknown_at) => {
                let consumed = resolution.consumed();
                let consumed = &consumed[..unknown_at.unwrap_or(consumed.len())];
                let node = self.tree.walk(consumed).unwrap_or(self.tree.root());

                help::branch_usage(&self.program, consumed, node).to_string()
            }
        }
    }

    fn dispatch_entry<'t>(
        &'t self,
        resolution: &Resolution<'t>,
    ) -> Result<(&'t EntryPoint, Invocation), ArgumentErrors> {
        if !resolution.errors().is_empty() {
            return Err(ArgumentErrors::new(
                resolution.errors().to_vec(),
                self.usage(resolution),
            ));
        }

        let node = resolution.node();

        let Some(entry) = node.entry_point() else {
            let expected = node.child_names().collect::<Vec<_>>().join("|");
            return Err(ArgumentErrors::new(
                vec![ArgumentError::IncompletePath { expected }],
                self.usage(resolution),
            ));
        };

        dispatch(entry, resolution.positionals(), resolution.options())
            .map(|invocation| (entry, invocation))
            .map_err(|errors| ArgumentErrors::new(errors, self.usage(resolution)))
    }

    /// Validate a resolution into an invocation, collecting every problem
    pub fn dispatch(&self, resolution: &Resolution<'_>) -> Result<Invocation, ArgumentErrors> {
        self.dispatch_entry(resolution)
            .map(|(_, invocation)| invocation)
    }

    /// The text help mode prints for this resolution: the root help, an
    /// entry point's full help, or a branch's usage
    pub fn help(&self, resolution: &Resolution<'_>) -> io::Result<String> {
        let mut out = Vec::new();
        self.write_help(&mut out, resolution)?;

        String::from_utf8(out).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn write_help(&self, out: &mut impl io::Write, resolution: &Resolution<'_>) -> io::Result<()> {
        let node = resolution.node();

        if ptr::eq(node, self.tree.root()) {
            return help::print_root_help(out, &self.program, &self.doc, &self.tree, &self.settings);
        }

        match node.entry_point() {
            Some(entry) => help::print_entry_help(out, &self.program, entry, &self.settings),
            None => writeln!(
                out,
                "{}",
                help::branch_usage(&self.program, resolution.consumed(), node)
            ),
        }
    }

    /**
    Run a command line (without the program name), writing help to `out`
    and argument errors to `err`. A handler's error is returned as is;
    everything the user got wrong is reported as [`Outcome::Rejected`].
     */
    pub fn run_with<I>(
        &self,
        args: I,
        out: &mut impl io::Write,
        err: &mut impl io::Write,
    ) -> anyhow::Result<Outcome>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .collect();

        let resolution = self.resolve(&args);

        if resolution.errors().is_empty() {
            let at_root = ptr::eq(resolution.node(), self.tree.root());
            let root_entry = resolution.node().entry_point().is_some();

            if resolution.help_requested() || (at_root && !root_entry) {
                self.write_help(out, &resolution)?;
                debug!(path = ?resolution.consumed(), "printed help");
                return Ok(Outcome::Help);
            }
        }

        match self.dispatch_entry(&resolution) {
            Err(errors) => {
                errors.write_to(err)?;
                debug!(errors = errors.errors().len(), "rejected command line");
                Ok(Outcome::Rejected(errors))
            }
            Ok((entry, invocation)) => {
                debug!(path = %entry.path(), "invoking entry point");
                entry.invoke(&invocation)?;
                Ok(Outcome::Invoked)
            }
        }
    }

    /// Run a command line (without the program name) against the process's
    /// standard output and error
    pub fn run<I>(&self, args: I) -> anyhow::Result<Outcome>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.run_with(args, &mut io::stdout().lock(), &mut io::stderr().lock())
    }

    /// Split `line` like a shell would, then [`run`][Cli::run] it
    pub fn run_line(&self, line: &str) -> anyhow::Result<Outcome> {
        self.run(util::split_line(line))
    }

    /// Run the process's own command line
    pub fn run_env(&self) -> anyhow::Result<Outcome> {
        self.run(LoadedArguments::from_env().arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entry::ArgumentSpec,
        options::OptionSpec,
        value::{IntKind, ValueType},
    };

    struct Static;

    impl DeclarationSource for Static {
        fn option_sets(&self) -> Vec<OptionSetDecl> {
            vec![OptionSetDecl::new("common").option(OptionSpec::flag("--verbose").short('v'))]
        }

        fn entry_points(&self) -> Vec<EntryPointDecl> {
            vec![
                EntryPointDecl::new("build", |_| Ok(()))
                    .argument(ArgumentSpec::new("name", ValueType::String))
                    .argument(ArgumentSpec::new("count", ValueType::Int(IntKind::I32)).default("1"))
                    .options("common"),
                EntryPointDecl::new("remote add", |_| Ok(())),
            ]
        }
    }

    fn cli() -> Cli {
        Cli::builder("prog").source(&Static).build().unwrap()
    }

    #[test]
    fn no_entry_points() {
        assert_eq!(
            Cli::builder("prog").build().unwrap_err(),
            DeclarationError::NoEntryPoints
        );
    }

    #[test]
    fn unknown_option_set_reference() {
        let err = Cli::builder("prog")
            .entry_point(EntryPointDecl::new("x", |_| Ok(())).options("missing"))
            .build()
            .unwrap_err();

        assert_eq!(err, DeclarationError::UnknownOptionSet("missing".to_owned()));
    }

    #[test]
    fn conflicting_arity_across_entry_points() {
        let err = Cli::builder("prog")
            .option_set(OptionSetDecl::new("a").option(OptionSpec::flag("--out")))
            .option_set(
                OptionSetDecl::new("b").option(OptionSpec::value("--out", ValueType::Path)),
            )
            .entry_point(EntryPointDecl::new("x", |_| Ok(())).options("a"))
            .entry_point(EntryPointDecl::new("y", |_| Ok(())).options("b"))
            .build()
            .unwrap_err();

        assert!(matches!(err, DeclarationError::ArityConflict { .. }));
    }

    #[test]
    fn dispatch_reports_incomplete_paths() {
        let cli = cli();
        let errors = cli.dispatch(&cli.resolve(&["remote"])).unwrap_err();

        assert_eq!(
            errors.errors(),
            [ArgumentError::IncompletePath {
                expected: "add".to_owned()
            }]
        );
        assert_eq!(
            errors.usage(),
            "Usage: prog remote add ...\nUse 'prog --help <cmd>' for help"
        );
    }

    #[test]
    fn unknown_path_usage_is_from_where_it_went_wrong() {
        let cli = cli();
        let resolution = cli.resolve(&["remote", "push", "add"]);

        assert_eq!(
            cli.usage(&resolution),
            "Usage: prog remote add ...\nUse 'prog --help <cmd>' for help"
        );
    }

    #[test]
    fn dispatch_produces_invocations() {
        let cli = cli();
        let invocation = cli.dispatch(&cli.resolve(&["build", "-v", "proj"])).unwrap();

        assert_eq!(invocation.get::<String>("name"), Ok("proj".to_owned()));
        assert_eq!(invocation.get::<i32>("count"), Ok(1));
        assert!(invocation.flag("--verbose"));
    }

    #[test]
    fn help_for_a_branch() {
        let cli = cli();
        assert_eq!(
            cli.help(&cli.resolve(&["help", "remote"])).unwrap(),
            "Usage: prog remote add ...\nUse 'prog --help <cmd>' for help\n"
        );
    }

    #[test]
    fn help_for_an_entry_point() {
        let cli = cli();
        assert_eq!(
            cli.help(&cli.resolve(&["--help", "build"])).unwrap(),
            "Usage: prog (--verbose) build <name> [count]\n\
            \n\
            Arguments:\n\
            \x20 name (string)\n\
            \x20 count (i32)   - [default: 1]\n\
            \n\
            Options:\n\
            \x20 --verbose (-v)\n"
        );
    }
}
