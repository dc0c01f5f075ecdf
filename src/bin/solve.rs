//! Interactive command dispatcher (spec §6 CLI surface, component C8 glue):
//! `kuhn`, `leduc`, `holdem <file>`, `tree-size`, `solve`, `help`, `exit`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use dcfr_solver_core::context::SolverContext;

#[derive(Parser, Debug)]
#[command(version, about = "DCFR solver for two-player zero-sum poker games")]
struct Args {
    /// Game to load and solve end-to-end in one shot (`kuhn`, `leduc`, `holdem`),
    /// for scripting without the REPL. Requires `--config` when `holdem`.
    #[arg(long)]
    game: Option<String>,

    /// YAML config file for `--game holdem`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single command non-interactively instead of starting the REPL
    /// (e.g. `solve holdem config.yaml` or `solve kuhn`).
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

/// Loads `game`/`config`, solves to the configured target, and prints the JSON
/// export -- the `--game`/`--config` one-shot path for scripted invocations.
fn run_one_shot(ctx: &mut SolverContext, game: &str, config: Option<&PathBuf>) -> Result<(), String> {
    match game {
        "kuhn" => ctx.load_kuhn(),
        "leduc" => ctx.load_leduc(true),
        "holdem" => {
            let path = config.ok_or("--game holdem requires --config <file>")?;
            ctx.load_holdem(path).map_err(|e| e.to_string())?;
        }
        other => return Err(format!("unknown game '{other}'")),
    }
    let report = ctx.solve().map_err(|e| e.to_string())?;
    println!("iterations: {}", report.iterations_run);
    println!("EV(P0):     {:.6}", report.ev_p0);
    println!("EV(P1):     {:.6}", report.ev_p1);
    println!("exploit.:   {:.6}", report.exploitability);
    let exported = ctx.export_json().map_err(|e| e.to_string())?;
    let s = serde_json::to_string_pretty(&exported).map_err(|e| e.to_string())?;
    println!("{s}");
    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  kuhn                load Kuhn poker");
    println!("  leduc [--no-iso]    load Leduc poker (suit isomorphism on by default)");
    println!("  holdem <file>       load a Hold'em setup from a YAML config file");
    println!("  tree-size           build the tree (if needed) and report its size");
    println!("  solve               run DCFR to the configured target exploitability");
    println!("  help                show this message");
    println!("  exit                quit");
}

fn dispatch(ctx: &mut SolverContext, line: &[String]) -> bool {
    let Some(cmd) = line.first() else { return true };
    match cmd.as_str() {
        "kuhn" => {
            ctx.load_kuhn();
            println!("loaded Kuhn poker");
        }
        "leduc" => {
            let use_isomorphism = !line.iter().any(|a| a == "--no-iso");
            ctx.load_leduc(use_isomorphism);
            println!("loaded Leduc poker (isomorphism={use_isomorphism})");
        }
        "holdem" => match line.get(1) {
            Some(path) => match ctx.load_holdem(&PathBuf::from(path)) {
                Ok(()) => println!("loaded Hold'em setup from {path}"),
                Err(e) => {
                    log::warn!("failed to load holdem config {path}: {e}");
                    eprintln!("error: {e}");
                }
            },
            None => eprintln!("error: holdem requires a config file path"),
        },
        "tree-size" => match ctx.tree_size_report() {
            Ok(report) => println!("{report}"),
            Err(e) => {
                log::warn!("tree-size failed: {e}");
                eprintln!("error: {e}");
            }
        },
        "solve" => match ctx.solve() {
            Ok(report) => {
                log::info!(
                    "solve finished after {} iterations, exploitability={:.6}",
                    report.iterations_run,
                    report.exploitability
                );
                println!("iterations: {}", report.iterations_run);
                println!("EV(P0):     {:.6}", report.ev_p0);
                println!("EV(P1):     {:.6}", report.ev_p1);
                println!("exploit.:   {:.6}", report.exploitability);
            }
            Err(e) => {
                log::warn!("solve failed: {e}");
                eprintln!("error: {e}");
            }
        },
        "export-json" => match ctx.export_json() {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(s) => println!("{s}"),
                Err(e) => eprintln!("error: {e}"),
            },
            Err(e) => {
                log::warn!("export-json failed: {e}");
                eprintln!("error: {e}");
            }
        },
        "help" => print_help(),
        "exit" | "quit" => return false,
        other => eprintln!("unknown command '{other}'; type 'help' for a list"),
    }
    true
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut ctx = SolverContext::new();

    if let Some(game) = args.game.as_deref() {
        if let Err(e) = run_one_shot(&mut ctx, game, args.config.as_ref()) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if !args.command.is_empty() {
        dispatch(&mut ctx, &args.command);
        return;
    }

    print_help();
    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error reading input: {e}");
                break;
            }
        }
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            continue;
        }
        if !dispatch(&mut ctx, &tokens) {
            break;
        }
    }
}
