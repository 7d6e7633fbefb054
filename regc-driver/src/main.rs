use std::{fs, io::Write, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use regc::{CompileOptions, Compiler, target};
use tracing::{Level, debug, error, info};

mod listing;

use listing::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Assembly listing
    Asm,
    /// Token stream after preprocessing
    Tokens,
    /// Syntax tree
    Ast,
}

#[derive(Parser)]
#[command(
    version,
    about = "Compile source into register-machine assembly",
    long_about = None
)]
struct Args {
    /// Source file to compile
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stage whose result is printed
    #[arg(long, value_enum, default_value_t = Emit::Asm)]
    emit: Emit,

    /// Prefix every instruction with its byte address
    #[arg(long)]
    annotate: bool,

    /// Size in bytes of one encoded instruction
    #[arg(
        long,
        default_value_t = target::INSTRUCTION_BYTE_LENGTH,
        value_parser = clap::value_parser!(u64).range(1..=target::MAX_INSTRUCTION_BYTE_LENGTH)
    )]
    instruction_bytes: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args, source: &str) -> Result<String> {
    let compiler = Compiler::new(CompileOptions {
        instruction_byte_length: args.instruction_bytes,
    });

    let result = match args.emit {
        Emit::Tokens => compiler
            .tokens(source)
            .map(|tokens| format!("{:#?}\n", tokens)),
        Emit::Ast => compiler.ast(source).map(|ast| format!("{:#?}\n", ast)),
        Emit::Asm => compiler.compile(source),
    };

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            error!(kind = ?err.kind(), stage = %err.stage(), "compilation failed");
            bail!("{}", err.report());
        }
    };

    if args.emit == Emit::Asm && args.annotate {
        let listing = Listing::parse(&output, args.instruction_bytes)
            .context("compiler produced an invalid listing")?;
        debug!(instructions = listing.len(), "annotating listing");
        return Ok(listing.annotate());
    }

    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(input = %args.input.display(), bytes = source.len(), "compiling");

    let mut output = run(&args, &source)
        .with_context(|| format!("compiling {}", args.input.display()))?;
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("writing {}", path.display()))?;
            info!(output = %path.display(), "wrote listing");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
