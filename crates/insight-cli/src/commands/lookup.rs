use crate::cli::SourceArgs;
use crate::support::{build_options_or_exit, print_json};
use insight_program::PROGRAM_DIR_VAR;
use insight_program::paths::join_candidate;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    candidate: String,
    path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupReport {
    program: String,
    templates: Vec<String>,
    candidates: Vec<Candidate>,
}

pub fn run(program: String, source: SourceArgs, json: bool) {
    let options = build_options_or_exit(&source);
    let mut env = options.env.clone();
    env.insert(PROGRAM_DIR_VAR.to_string(), program.clone());

    let candidates = options
        .lookup_paths
        .expand(&env)
        .into_iter()
        .map(|candidate| {
            let joined = join_candidate(&program, &candidate);
            Candidate {
                path: options.resolve(&joined).display().to_string(),
                candidate,
            }
        })
        .collect();
    let report = LookupReport {
        templates: options.lookup_paths.templates().to_vec(),
        program,
        candidates,
    };

    if json {
        print_json(&report);
    } else {
        println!("program-insight lookup");
        println!("  program: {}", report.program);
        println!("  candidates (base first): {}", report.candidates.len());
        for candidate in &report.candidates {
            println!("    - {} -> {}", candidate.candidate, candidate.path);
        }
    }
}
