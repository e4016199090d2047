use std::{fs, path::Path, path::PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blockc::lang::flow::{Project, decode_flow};
use blockc::program::{codec, outline::print_outline};
use blockc::{Compiler, CompilerConfig, Program};

#[derive(Parser)]
#[command(name = "blockc", about = "Compile block-editor flows into program trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with lookup tables and naming conventions
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Also write the program as postcard bytes to this file
    #[arg(long, global = true)]
    postcard: Option<PathBuf>,

    /// Print a structural outline instead of JSON
    #[arg(long, global = true)]
    outline: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a mouse program flow
    Program { flow: PathBuf },

    /// Compile a named action flow
    Action { name: String, flow: PathBuf },

    /// Compile a project file with actions and mice
    Project { project: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CompilerConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => CompilerConfig::default(),
    };
    let compiler = Compiler::new(config);

    let compiled = match &cli.command {
        Command::Program { flow } => {
            let flow = decode_flow(&read_json(flow)).unwrap_or_else(|e| fail(e));
            compiler.compile_program(&flow)
        }
        Command::Action { name, flow } => {
            let flow = decode_flow(&read_json(flow)).unwrap_or_else(|e| fail(e));
            compiler.compile_action(name, &flow)
        }
        Command::Project { project } => {
            let project = Project::from_json(&read_json(project)).unwrap_or_else(|e| fail(e));
            compiler.compile_project(&project)
        }
    };

    let program = compiled.unwrap_or_else(|e| fail(e));
    emit(&cli, &program);
}

fn emit(cli: &Cli, program: &Program) {
    if let Some(path) = &cli.postcard {
        let bytes = codec::to_bytes(program).unwrap_or_else(|e| fail(e));
        if let Err(e) = fs::write(path, bytes) {
            fail(format!("Failed to write '{}': {}", path.display(), e));
        }
    }

    if cli.outline {
        print_outline(program);
        return;
    }

    let json = if cli.pretty {
        codec::to_json_pretty(program)
    } else {
        codec::to_json(program)
    };
    println!("{}", json.unwrap_or_else(|e| fail(e)));
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => fail(format!("Failed to read '{}': {}", path.display(), e)),
    };

    match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(e) => fail(format!("Invalid JSON in '{}': {}", path.display(), e)),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
