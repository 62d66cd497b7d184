use crate::support::{exit_on_errors, print_diagnostics, print_json, runtime_or_exit};
use insight_program::{InsightOptions, parse_descriptor};
use serde_json::Value;

pub fn run(file: String, root: Option<String>, json: bool, deny_errors: bool) {
    let mut options = InsightOptions::default();
    if let Some(root) = root {
        options = options.with_root_path(root);
    }

    let runtime = runtime_or_exit();
    let descriptor = runtime.block_on(parse_descriptor(file.as_str(), &options));

    if json {
        print_json(&descriptor);
    } else {
        println!("program-insight descriptor");
        println!("  file: {file}");
        let keys: Vec<&str> = descriptor.normalized.keys().map(String::as_str).collect();
        if keys.is_empty() {
            println!("  normalized keys: (none)");
        } else {
            println!("  normalized keys: {}", keys.join(", "));
        }
        if let Some(Value::String(boot)) = descriptor
            .normalized
            .get("boot")
            .and_then(|boot| boot.get("package"))
        {
            println!("  boot package: {boot}");
        }
        print_diagnostics("  ", &descriptor.warnings, &descriptor.errors);
    }

    exit_on_errors(deny_errors, descriptor.has_errors());
}
