/*!
A declarative command tree and option parser. Register entry points at
command paths (`build`, `remote add`) along with the positional arguments and
option sets they accept; argtree resolves a raw command line into exactly one
typed, validated [`Invocation`], or prints a precise usage or help message.

```
use std::{io, sync::{Arc, Mutex}};

use argtree::{ArgumentSpec, Cli, EntryPointDecl, OptionSetDecl, OptionSpec, Outcome, ValueType};

let built = Arc::new(Mutex::new(None));
let sink = Arc::clone(&built);

let cli = Cli::builder("prog")
    .option_set(OptionSetDecl::new("build").option(OptionSpec::flag("--verbose").short('v')))
    .entry_point(
        EntryPointDecl::new("build", move |invocation| {
            let name: String = invocation.get("name")?;
            let count: u32 = invocation.get("count")?;
            *sink.lock().unwrap() = Some((name, count, invocation.flag("--verbose")));
            Ok(())
        })
        .argument(ArgumentSpec::new("name", ValueType::String))
        .argument(ArgumentSpec::new("count", ValueType::of::<u32>()).default("1"))
        .options("build"),
    )
    .build()?;

let outcome = cli.run_with(["build", "-v", "proj"], &mut io::sink(), &mut io::sink())?;

assert!(matches!(outcome, Outcome::Invoked));
assert_eq!(*built.lock().unwrap(), Some(("proj".to_owned(), 1, true)));
# Ok::<(), anyhow::Error>(())
```

The command line grammar is `(options...) (path segments...) (arguments...)`,
with options allowed anywhere. Boolean options *toggle* their default on each
occurrence. `help`, `--help` or `?` as the very first argument prints help for
whatever the rest of the command line resolves to.

The pieces are public for callers that want them separately: [`resolve`]
splits a command line, [`dispatch`] validates it, and [`help`] renders usage.
*/

pub mod arguments;
pub mod cli;
pub mod dispatch;
pub mod entry;
pub mod errors;
pub mod help;
mod impls;
pub mod options;
pub mod resolve;
pub mod tree;
pub mod util;
pub mod value;

pub use argtree_parser::Arg;

pub use crate::{
    arguments::LoadedArguments,
    cli::{Cli, CliBuilder, DeclarationSource, Outcome, Settings},
    entry::{ArgumentSpec, EntryPoint, EntryPointDecl, Handler, Invocation},
    errors::{AccessError, ArgumentError, ArgumentErrors, DeclarationError},
    impls::{Choice, FromValue},
    options::{OptionSet, OptionSetDecl, OptionSpec, Options},
    resolve::{RawOption, Resolution},
    tree::CommandPath,
    value::{EnumType, FloatKind, IntKind, Value, ValueType},
};
