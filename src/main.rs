use std::env;
use std::process::ExitCode;

use algebra_cas::runner;
use algebra_cas::Config;

/// Minimal positional dispatch over the three operations (spec.md §6): no
/// flags, just enough surface to exercise the engine from a shell.
pub fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let config = Config::default();

    let result = match args.get(1).map(String::as_str) {
        Some("simplify") if args.len() == 3 => runner::simplify(&args[2], &config).map(|s| vec![s]),
        Some("isolate") if args.len() == 4 => runner::isolate(&args[2], &args[3], &config).map(|s| vec![s]),
        Some("solve") if args.len() >= 4 => {
            let variable = &args[args.len() - 1];
            let equations: Vec<&str> = args[2..args.len() - 1].iter().map(String::as_str).collect();
            runner::solve(&equations, variable, &config).map(|out| {
                let mut lines = out.steps;
                lines.push(out.result);
                lines
            })
        }
        _ => {
            eprintln!("usage:");
            eprintln!("  algebra-cas simplify <expr>");
            eprintln!("  algebra-cas isolate <equation> <variable>");
            eprintln!("  algebra-cas solve <equation>... <variable>");
            return ExitCode::from(64);
        }
    };

    match result {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
