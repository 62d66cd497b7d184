use crate::cli::SourceArgs;
use insight_program::{InsightConfig, InsightOptions, LookupPaths};
use insight_rules::{Failure, Warning};
use serde::Serialize;
use std::collections::BTreeMap;
use std::process;

/// Options from defaults, then the config file, then flags.
pub fn build_options_or_exit(source: &SourceArgs) -> InsightOptions {
    let env: BTreeMap<String, String> = if source.inherit_env {
        std::env::vars().collect()
    } else {
        BTreeMap::new()
    };
    let mut options = InsightOptions::default().with_env(env);

    if let Some(path) = &source.config {
        let config = InsightConfig::load(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });
        tracing::debug!(path = %path, "loaded config file");
        options = config.apply_to(options);
    }

    if let Some(root) = &source.root {
        options = options.with_root_path(root);
    }
    for (name, value) in &source.env {
        options = options.with_var(name, value);
    }
    if !source.lookup.is_empty() {
        options = options.with_lookup_paths(LookupPaths::new(source.lookup.iter().cloned()));
    }
    options
}

pub fn runtime_or_exit() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        })
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization")
    );
}

pub fn print_diagnostics(indent: &str, warnings: &[Warning], errors: &[Failure]) {
    println!("{indent}warnings: {}", warnings.len());
    for warning in warnings {
        println!(
            "{indent}  - [{}] {}{}",
            warning.stage,
            warning.message,
            context_suffix(&warning.context)
        );
    }
    println!("{indent}errors: {}", errors.len());
    for failure in errors {
        println!(
            "{indent}  - [{}] {}{}",
            failure.stage,
            failure.message,
            context_suffix(&failure.context)
        );
        for line in failure.detail.lines() {
            println!("{indent}      {line}");
        }
    }
}

fn context_suffix(context: &[String]) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" ({})", context.join(" "))
    }
}

pub fn exit_on_errors(deny_errors: bool, has_errors: bool) {
    if deny_errors && has_errors {
        eprintln!("error: descriptor errors recorded (--deny-errors)");
        process::exit(1);
    }
}
