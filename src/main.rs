//! Command-line interface for the Mini-LOL front end.
//!
//! `minilol compile --input prog.lol` scans and parses a source file and
//! prints the compiler listing; `minilol grammar` prints the symbol catalog
//! and the rule table. Logging is controlled through `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use minilol::{Frontend, Options, load_lines};
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scans and parses a Mini-LOL program
    Compile {
        /// Input file with Mini-LOL source
        #[arg(short, long)]
        input: String,
        /// Do not echo the source lines
        #[arg(long)]
        quiet_input: bool,
        /// Print every scanner finding
        #[arg(long)]
        findings: bool,
        /// Do not print the parser trace
        #[arg(long)]
        no_trace: bool,
        /// Print symbol-table additions
        #[arg(long)]
        additions: bool,
        /// Do not print the symbol table
        #[arg(long)]
        no_symtab: bool,
        /// Maximum number of parser steps
        #[arg(long, default_value_t = minilol::parser::DEFAULT_STEP_BUDGET)]
        step_budget: usize,
    },
    /// Prints the symbol catalog and the rule table
    Grammar {},
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let args = Args::parse();
    let frontend = Frontend::try_new().context("can't build the front end")?;

    match args.command {
        Commands::Compile {
            input,
            quiet_input,
            findings,
            no_trace,
            additions,
            no_symtab,
            step_budget,
        } => {
            let options = Options {
                print_input: !quiet_input,
                scanner_findings: findings,
                parser_trace: !no_trace,
                print_additions: additions,
                print_symtab: !no_symtab,
                step_budget,
                ..Options::default()
            };
            let lines = load_lines(&input).with_context(|| format!("can't read {:?}", input))?;
            let out = frontend.compile(&lines, &options);
            print!("{}", out.report(lines.as_slice(), &options));
            log::info!("Stats: {:?}, {:?}", out.lexer_stats, out.parser_stats);
            if out.accepted() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Grammar {} => {
            for (code, name) in frontend.catalog().iter() {
                println!("{:>3}  {}", code.as_u8(), name);
            }
            println!();
            print!("{}", frontend.rules().describe(frontend.catalog()));
            Ok(ExitCode::SUCCESS)
        }
    }
}
