use std::{
    fs,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use lean_extract::{
    discover,
    error::Result,
    namespace::AstScanner,
    output::{process_module, JsonlWriter, OperatorTally},
    project::Project,
    source::SourceMap,
};

#[derive(Parser)]
#[command(name = "lean-extract")]
#[command(about = "Extract theorem and tactic data from Lean 4 elaboration artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract theorem records from declaration and info-tree artifacts
    Extract(ExtractArgs),
    /// Scan raw syntax artifacts for declarations (text-level fallback)
    Scan(ExtractArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Project root holding the Lean sources
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Artifact directory (defaults to <root>/.jixia)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Output JSONL file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Only process modules whose dotted name starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Extra source root as PREFIX=PATH, e.g. Mathlib=.lake/packages/mathlib
    #[arg(long = "source-root", value_parser = parse_source_root)]
    source_roots: Vec<(String, PathBuf)>,
}

fn parse_source_root(spec: &str) -> std::result::Result<(String, PathBuf), String> {
    spec.split_once('=')
        .map(|(prefix, path)| (prefix.to_string(), PathBuf::from(path)))
        .ok_or_else(|| format!("expected PREFIX=PATH, got '{spec}'"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lean_extract=info".parse().expect("valid directive")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Extract(args) => run_extract(&args),
        Commands::Scan(args) => run_scan(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn open_project(args: &ExtractArgs) -> Project {
    let artifacts = args
        .artifacts
        .clone()
        .unwrap_or_else(|| args.root.join(".jixia"));
    let mut sources = SourceMap::new(&args.root);
    for (prefix, path) in &args.source_roots {
        sources = sources.with_root(prefix.clone(), path.clone());
    }
    Project::new(artifacts, sources)
}

fn open_output(args: &ExtractArgs) -> Result<JsonlWriter<BufWriter<Box<dyn Write>>>> {
    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(fs::File::create(path)?),
        None => Box::new(io::stdout()),
    };
    Ok(JsonlWriter::new(BufWriter::new(out)))
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let project = open_project(args);
    let mut writer = open_output(args)?;
    let mut tally = OperatorTally::default();

    let mut written = 0usize;
    for module in discover::lean_modules(&args.root, args.prefix.as_deref()) {
        match process_module(&project, &module, &mut writer, &mut tally) {
            Ok(count) => written += count,
            Err(e) => {
                tracing::warn!(module = %module.join("."), error = %e, "module failed, skipping");
            }
        }
    }
    writer.flush()?;
    tracing::info!(theorems = written, operators = %tally, "extraction finished");
    Ok(())
}

fn run_scan(args: &ExtractArgs) -> Result<()> {
    let project = open_project(args);
    let mut writer = open_output(args)?;

    let mut written = 0usize;
    for module in discover::lean_modules(&args.root, args.prefix.as_deref()) {
        let name = module.join(".");
        let ast = match project.load_ast(&module) {
            Ok(Some(ast)) => ast,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "unreadable syntax artifact");
                continue;
            }
        };
        let source = match fs::read(project.sources().resolve(&module)) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "source file unavailable");
                continue;
            }
        };
        for decl in AstScanner::new(&name, &source).scan(&ast) {
            writer.write(&decl)?;
            written += 1;
        }
    }
    writer.flush()?;
    tracing::info!(declarations = written, "scan finished");
    Ok(())
}
