mod error;

use std::{env, io, path::PathBuf, process::ExitCode};

use argtree::{
    ArgumentSpec, Choice, Cli, DeclarationSource, EntryPointDecl, Invocation, LoadedArguments,
    OptionSetDecl, OptionSpec, Outcome, ValueType,
};
use lazy_format::lazy_format;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::DemoError;

#[derive(Debug, Clone, Copy)]
enum Profile {
    Debug,
    Release,
}

impl Choice for Profile {
    const NAME: &'static str = "Profile";
    const MEMBERS: &'static [&'static str] = &["DEBUG", "RELEASE"];

    fn from_member(index: usize) -> Option<Self> {
        match index {
            0 => Some(Profile::Debug),
            1 => Some(Profile::Release),
            _ => None,
        }
    }
}

fn build(invocation: &Invocation) -> anyhow::Result<()> {
    let name: String = invocation.get("name")?;
    let count: u32 = invocation.get("count")?;
    let jobs: u8 = invocation.get("--jobs")?;
    let profile: Profile = invocation.choice("--profile")?;
    let verbose = invocation.flag("--verbose");

    let out: Option<PathBuf> = invocation
        .options()
        .map(|options| options.try_get("--out"))
        .transpose()?
        .flatten();

    if let Some(out) = &out
        && *out == env::current_dir()?
    {
        return Err(DemoError::OutputIsWorkingDir {
            name,
            out: out.clone(),
        }
        .into());
    }

    info!(%name, count, jobs, verbose, "building");

    let destination = lazy_format!(match (&out) {
        Some(out) => (" into {}", out.display()),
        None => "",
    });

    let detail = lazy_format!(match (verbose) {
        true => (" ({:?}, {} jobs)", profile, jobs),
        false => "",
    });

    for round in 1..=count {
        println!("building {name}{destination}, round {round} of {count}{detail}");
    }

    Ok(())
}

fn remote_add(invocation: &Invocation) -> anyhow::Result<()> {
    let name: String = invocation.get("name")?;
    let url: String = invocation.get("url")?;

    if name == "origin" {
        return Err(DemoError::ReservedRemote(name).into());
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(DemoError::UnsupportedUrl(url).into());
    }

    println!("added remote {name} at {url}");
    Ok(())
}

fn remote_remove(invocation: &Invocation) -> anyhow::Result<()> {
    let name: String = invocation.get("name")?;

    println!("removed remote {name}");
    Ok(())
}

/// Every command this program knows
struct Commands;

impl DeclarationSource for Commands {
    fn option_sets(&self) -> Vec<OptionSetDecl> {
        vec![
            OptionSetDecl::new("output")
                .option(
                    OptionSpec::flag("--verbose")
                        .short('v')
                        .description("describe each round"),
                )
                .option(
                    OptionSpec::value("--out", ValueType::of::<PathBuf>())
                        .short('o')
                        .value_name("dir")
                        .description("where to put the results"),
                ),
            OptionSetDecl::new("build")
                .option(
                    OptionSpec::value("--jobs", ValueType::of::<u8>())
                        .short('j')
                        .value_name("n")
                        .default("4")
                        .description("how many jobs to run at once"),
                )
                .option(
                    OptionSpec::value("--profile", ValueType::choice::<Profile>())
                        .short('p')
                        .default("debug")
                        .description("which profile to build with"),
                )
                .nest("output"),
        ]
    }

    fn entry_points(&self) -> Vec<EntryPointDecl> {
        vec![
            EntryPointDecl::new("build", build)
                .help("Build a project, possibly several times")
                .argument(
                    ArgumentSpec::new("name", ValueType::String).description("project to build"),
                )
                .argument(
                    ArgumentSpec::new("count", ValueType::of::<u32>())
                        .default("1")
                        .description("how many times to build it"),
                )
                .options("build"),
            EntryPointDecl::new("remote add", remote_add)
                .help("Register a remote")
                .argument(ArgumentSpec::new("name", ValueType::String))
                .argument(
                    ArgumentSpec::new("url", ValueType::String)
                        .description("must be an http or https url"),
                ),
            EntryPointDecl::new("remote remove", remote_remove)
                .help("Forget a remote")
                .argument(ArgumentSpec::new("name", ValueType::String)),
        ]
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let arguments = LoadedArguments::from_env();
    let program = arguments
        .program_name()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());

    let cli = Cli::builder(program)
        .doc("A demonstration of argtree command trees")
        .source(&Commands)
        .build()?;

    Ok(match cli.run(arguments.arguments())? {
        Outcome::Invoked | Outcome::Help => ExitCode::SUCCESS,
        Outcome::Rejected(_) => ExitCode::from(2),
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
