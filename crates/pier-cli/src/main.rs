use std::fs;
use std::path::Path;

use clap::Parser;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use pier_core::{
    active_file, dump_outcome, plan_dependencies, EnvPreparer, ImportNameTable, MetadataError,
    ModuleResolver, ResolutionOutcome, VirtualFile,
};

mod backend;
mod cli;

use backend::{AssumeMissing, PipPackageManager, PythonProbe};
use cli::{PierCli, PierCommand, PrepareArgs, ResolveArgs, RuntimeArgs};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = PierCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create runtime")?;
    let code = runtime.block_on(run(&cli))?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("pier={level},pier_domain={level},pier_core={level},pier_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn run(cli: &PierCli) -> Result<i32> {
    match &cli.command {
        PierCommand::Resolve(args) => resolve(cli, args),
        PierCommand::Prepare(args) => prepare(cli, args).await,
    }
}

fn resolve(cli: &PierCli, args: &ResolveArgs) -> Result<i32> {
    let files = load_batch(&args.batch)?;
    let table = load_table(args.runtime.name_table.as_deref())?;
    let resolver = module_resolver(&args.runtime);

    let Some(active) = active_file(&files) else {
        return emit(cli, &ResolutionOutcome::success(None));
    };

    match plan_dependencies(&active.content, resolver.as_ref(), &table) {
        Ok(dependencies) => emit(cli, &ResolutionOutcome::success(dependencies)),
        Err(err) => user_error(&err),
    }
}

async fn prepare(cli: &PierCli, args: &PrepareArgs) -> Result<i32> {
    let files = load_batch(&args.batch)?;
    let table = load_table(args.runtime.name_table.as_deref())?;
    let resolver = module_resolver(&args.runtime);
    let workdir = match &args.workdir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().wrap_err("unable to resolve current directory")?,
    };

    let env = EnvPreparer::new(
        PipPackageManager::new(&args.runtime.python),
        resolver,
        table,
        workdir,
    );
    match env.prepare(&files).await {
        Ok(outcome) => emit(cli, &outcome),
        Err(err) => match err.downcast_ref::<MetadataError>() {
            Some(metadata) => user_error(metadata),
            None => Err(eyre!("{err:?}")),
        },
    }
}

fn load_batch(path: &Path) -> Result<Vec<VirtualFile>> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("unable to read batch {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("invalid batch {}", path.display()))
}

fn load_table(path: Option<&Path>) -> Result<ImportNameTable> {
    let Some(path) = path else {
        return Ok(ImportNameTable::default());
    };
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("unable to read name table {}", path.display()))?;
    ImportNameTable::from_json(&raw)
        .wrap_err_with(|| format!("invalid name table {}", path.display()))
}

fn module_resolver(runtime: &RuntimeArgs) -> Box<dyn ModuleResolver> {
    if runtime.no_probe {
        Box::new(AssumeMissing)
    } else {
        Box::new(PythonProbe::new(&runtime.python))
    }
}

fn emit(cli: &PierCli, outcome: &ResolutionOutcome) -> Result<i32> {
    if cli.json {
        println!("{}", dump_outcome(outcome).map_err(|err| eyre!("{err:?}"))?);
    } else if !cli.quiet {
        match outcome {
            ResolutionOutcome::Success { dependencies: None } => {
                println!("Nothing to do: no active file or source not analyzable");
            }
            ResolutionOutcome::Success {
                dependencies: Some(dependencies),
            } if dependencies.is_empty() => {
                println!("All imports satisfied; nothing to install");
            }
            ResolutionOutcome::Success {
                dependencies: Some(dependencies),
            } => {
                println!("Dependencies: {}", dependencies.join(", "));
            }
            ResolutionOutcome::Error { message } => {
                eprintln!("Installation failed:\n{message}");
            }
        }
    }
    Ok(match outcome {
        ResolutionOutcome::Success { .. } => 0,
        ResolutionOutcome::Error { .. } => 2,
    })
}

fn user_error(err: &dyn std::error::Error) -> Result<i32> {
    eprintln!("Error: {err}");
    Ok(1)
}
