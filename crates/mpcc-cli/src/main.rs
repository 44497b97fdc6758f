//! `mpcc`: the command-line front end, grounded on `compile_script.py`'s
//! contract (positional source file, optional output path, IR written one
//! instruction per line) and `lmlang-cli`'s `#[derive(Parser)]` shape.

use std::path::PathBuf;
use std::process;
use std::{fs, io};

use clap::Parser;

use mpcc_codegen::{CodegenError, CompileReport};

/// Compiler for the secret-aware expression language.
#[derive(Parser)]
#[command(name = "mpcc", about = "Compiler for the secret-aware expression language")]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Output path for the emitted IR.
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Dump a JSON compile report (warnings + IR) to stdout instead of
    /// writing the IR file.
    #[arg(long)]
    json: bool,

    /// Print a snapshot of `main` after every rewrite pass.
    #[arg(long)]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(cli));
}

/// Exit codes: `0` success, `1` any reported compile error, `2` an I/O
/// error opening the source file or writing the output.
fn run(cli: Cli) -> i32 {
    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(e) => return io_error(&cli.input, e),
    };

    let program = match mpcc_syntax::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            println!("{e}");
            return 1;
        }
    };

    let report = if cli.trace {
        match mpcc_codegen::compile_with_trace(program) {
            Ok((report, trace)) => {
                for step in &trace {
                    println!("-- after {} --\n{}", step.pass, step.program);
                }
                report
            }
            Err(e) => return report_error(&e),
        }
    } else {
        match mpcc_codegen::compile(program) {
            Ok(report) => report,
            Err(e) => return report_error(&e),
        }
    };

    write_report(&report, &cli)
}

fn report_error(err: &CodegenError) -> i32 {
    match err {
        CodegenError::Invalid { diagnostics } => {
            for diagnostic in diagnostics {
                println!("{diagnostic}");
            }
        }
        other => println!("{other}"),
    }
    1
}

fn write_report(report: &CompileReport, cli: &Cli) -> i32 {
    for warning in &report.warnings {
        println!("{warning}");
    }

    if cli.json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(e) => {
                println!("ERROR: failed to serialize compile report: {e}");
                2
            }
        }
    } else {
        let mut text = report.ir.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        match fs::write(&cli.output, text) {
            Ok(()) => 0,
            Err(e) => io_error(&cli.output, e),
        }
    }
}

fn io_error(path: &PathBuf, err: io::Error) -> i32 {
    println!("ERROR: I/O error on '{}': {err}", path.display());
    2
}
