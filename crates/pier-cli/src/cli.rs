use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prepare a sandboxed Python environment from a batch of virtual files"
)]
pub struct PierCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v", global = true)]
    pub trace: bool,
    #[arg(long, help = "Emit the outcome as JSON", global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: PierCommand,
}

#[derive(Subcommand, Debug)]
pub enum PierCommand {
    #[command(about = "Resolve the active file's dependencies without installing")]
    Resolve(ResolveArgs),
    #[command(about = "Materialize the batch, resolve dependencies, and install them")]
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[arg(help = "JSON batch of {name, content, active} file records")]
    pub batch: PathBuf,
    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    #[arg(help = "JSON batch of {name, content, active} file records")]
    pub batch: PathBuf,
    #[arg(
        long,
        help = "Directory to materialize files into (defaults to the current directory)"
    )]
    pub workdir: Option<PathBuf>,
    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

#[derive(Args, Debug)]
pub struct RuntimeArgs {
    #[arg(
        long,
        default_value = "python3",
        env = "PIER_PYTHON",
        help = "Python interpreter used to probe importability and run pip"
    )]
    pub python: String,
    #[arg(long, help = "JSON module-name to package-name table")]
    pub name_table: Option<PathBuf>,
    #[arg(
        long,
        help = "Treat every imported module as missing instead of probing the interpreter"
    )]
    pub no_probe: bool,
}
