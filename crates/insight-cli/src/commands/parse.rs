use crate::cli::SourceArgs;
use crate::support::{
    build_options_or_exit, exit_on_errors, print_diagnostics, print_json, runtime_or_exit,
};
use insight_program::resolve_program_with_summary;
use std::process;

pub struct Args {
    pub program: String,
    pub source: SourceArgs,
    pub include_packages: bool,
    pub strict_packages: bool,
    pub debug: bool,
    pub json: bool,
    pub deny_errors: bool,
}

pub fn run(args: Args) {
    let mut options = build_options_or_exit(&args.source);
    if args.include_packages {
        options.include_packages = true;
    }
    if args.strict_packages {
        options.optional_packages = false;
    }
    if args.debug {
        options.debug = true;
    }

    let runtime = runtime_or_exit();
    let (program, summary) = runtime
        .block_on(resolve_program_with_summary(&args.program, &options))
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });

    if args.json {
        print_json(&program);
    } else {
        println!("program-insight parse");
        println!("  program: {}", program.dirpath);
        println!("  id: {}", program.id);
        let sources: Vec<&str> = program.raw.keys().map(String::as_str).collect();
        if sources.is_empty() {
            println!("  sources: (none)");
        } else {
            println!("  sources: {}", sources.join(", "));
        }
        if let Some(boot) = program.combined.boot_package() {
            println!("  boot package: {boot}");
        }
        println!(
            "  packages: {} (parsed {}, aliased {}, missing {})",
            program.combined.packages.len(),
            summary.parsed,
            summary.aliased,
            summary.missing
        );
        for (reference, package) in &program.combined.packages {
            println!(
                "    - {reference} (warnings {}, errors {})",
                package.warnings.len(),
                package.errors.len()
            );
        }
        print_diagnostics("  ", &program.warnings, &program.errors);
    }

    exit_on_errors(args.deny_errors, program.has_errors_anywhere());
}
