use clap::{App, Arg, ErrorKind};
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use tlox::ast::AstPrinter;
use tlox::{Diagnostics, Lox, Outcome};

// sysexits(3)
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;
const EX_IOERR: i32 = 74;

fn main() {
    init_tracing();

    let matches = App::new("tlox")
        .about("Tree-walking interpreter for Lox")
        .arg(
            Arg::with_name("script")
                .help("Script to run; starts a prompt when omitted")
                .index(1),
        )
        .arg(
            Arg::with_name("dump-ast")
                .long("dump-ast")
                .requires("script")
                .help("Print the parsed program instead of running it"),
        )
        .get_matches_safe()
        .unwrap_or_else(|e| match e.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                process::exit(EX_USAGE);
            }
        });

    match matches.value_of("script") {
        Some(path) => {
            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("Could not read '{}': {}", path, e);
                    process::exit(EX_IOERR);
                }
            };
            if matches.is_present("dump-ast") {
                process::exit(dump_ast(&source));
            }
            process::exit(run_file(&source));
        }
        None => run_prompt(),
    }
}

/// Logging is opt-in through `RUST_LOG` so it never mixes with program output.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}

fn run_file(source: &str) -> i32 {
    let mut lox = Lox::new();
    let mut diagnostics = Diagnostics::new();
    let outcome = lox.run(source, &mut diagnostics);
    report(&diagnostics);
    match outcome {
        Outcome::Completed => 0,
        Outcome::CompletedWithParseErrors => EX_DATAERR,
        Outcome::CompletedWithRuntimeError => EX_SOFTWARE,
    }
}

fn dump_ast(source: &str) -> i32 {
    let mut diagnostics = Diagnostics::new();
    let statements = tlox::parse_source(source, &mut diagnostics);
    if diagnostics.has_errors() {
        report(&diagnostics);
        return EX_DATAERR;
    }
    for statement in &statements {
        println!("{}", AstPrinter::print_statement(statement));
    }
    0
}

fn run_prompt() {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return;
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("{}", e);
                return;
            }
            None => return,
        };
        let mut diagnostics = Diagnostics::new();
        lox.run(&line, &mut diagnostics);
        report(&diagnostics);
    }
}
