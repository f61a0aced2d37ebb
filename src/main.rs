//! reconcile-engine CLI
//!
//! Run rules-driven bank reconciliation from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Match a statement batch against rules
//! reconcile-engine match --rules rules.json --scenario batch.json
//!
//! # Output as JSON
//! reconcile-engine match --rules rules.json --scenario batch.json --format json
//!
//! # Generate a random scenario for testing
//! reconcile-engine generate --partners 10 --invoices 50 --lines 40
//! ```

use reconcile_engine::matching::matcher::{MatchOptions, MatchStatus, ReconcileEngine};
use reconcile_engine::rules::model::ReconcileModel;
use reconcile_engine::simulation::scenario::{generate_scenario, Scenario, ScenarioConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"reconcile-engine — rules-driven bank statement reconciliation

USAGE:
    reconcile-engine <COMMAND> [OPTIONS]

COMMANDS:
    match       Match a statement batch against reconciliation rules
    generate    Generate a random scenario (for testing)
    help        Show this message

OPTIONS (match):
    --rules <FILE>      Path to JSON rules file
    --scenario <FILE>   Path to JSON scenario file (context, candidates, lines)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --partners <N>      Number of partners (default: 10)
    --invoices <N>      Number of open invoices (default: 50)
    --lines <N>         Number of statement lines (default: 40)
    --hit-ratio <F>     Share of lines quoting an invoice reference (default: 0.6)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    reconcile-engine match --rules rules.json --scenario batch.json
    reconcile-engine match --rules rules.json --scenario batch.json --format json
    reconcile-engine generate --partners 20 --invoices 100 --lines 80
    reconcile-engine generate --lines 500 --hit-ratio 0.9 --output batch.json"#
    );
}

/// JSON schema for the rules file.
#[derive(serde::Deserialize)]
struct RulesFile {
    rules: Vec<ReconcileModel>,
}

fn load_rules(path: &str) -> Vec<ReconcileModel> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: RulesFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "rules": [
    {{ "id": 1, "name": "Invoice matching", "rule_type": "invoices" }}
  ]
}}"#
        );
        process::exit(1);
    });
    file.rules
}

fn load_scenario(path: &str) -> Scenario {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        process::exit(1);
    })
}

fn cmd_match(args: &[String]) {
    let mut rules_path = None;
    let mut scenario_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rules" => {
                i += 1;
                rules_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--rules requires a file path");
                    process::exit(1);
                }));
            }
            "--scenario" => {
                i += 1;
                scenario_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--scenario requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let rules_path = rules_path.unwrap_or_else(|| {
        eprintln!("Error: --rules <FILE> is required");
        process::exit(1);
    });
    let scenario_path = scenario_path.unwrap_or_else(|| {
        eprintln!("Error: --scenario <FILE> is required");
        process::exit(1);
    });

    let rules = load_rules(&rules_path);
    let scenario = load_scenario(&scenario_path);

    let engine = ReconcileEngine::new(rules).unwrap_or_else(|e| {
        eprintln!("Invalid rule configuration: {}", e);
        process::exit(1);
    });

    let results = engine.run(
        &scenario.lines,
        &scenario.candidates,
        &scenario.context,
        &MatchOptions::new(),
    );

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&results).unwrap());
    } else {
        let mut matched = 0;
        let mut reconciled = 0;
        for (line, result) in scenario.lines.iter().zip(&results) {
            match result.status {
                MatchStatus::None if result.model.is_none() => {
                    println!("  {:<40} no match", truncate(line.label(), 40));
                    continue;
                }
                _ => {}
            }
            matched += 1;
            let rule = result.model_name.as_deref().unwrap_or("-");
            let status = match result.status {
                MatchStatus::Reconciled => {
                    reconciled += 1;
                    "reconciled"
                }
                MatchStatus::WriteOff => "write-off suggested",
                MatchStatus::None => "suggested",
            };
            println!(
                "  {:<40} {:<20} rule '{}', {} candidate(s)",
                truncate(line.label(), 40),
                status,
                rule,
                result.candidate_ids.len()
            );
        }
        println!(
            "\n{} lines, {} matched, {} auto-reconciled",
            results.len(),
            matched,
            reconciled
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn cmd_generate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--partners" => {
                i += 1;
                config.partner_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--partners requires a number");
                    process::exit(1);
                });
            }
            "--invoices" => {
                i += 1;
                config.invoice_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--invoices requires a number");
                    process::exit(1);
                });
            }
            "--lines" => {
                i += 1;
                config.line_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--lines requires a number");
                    process::exit(1);
                });
            }
            "--hit-ratio" => {
                i += 1;
                config.reference_hit_ratio =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--hit-ratio requires a number in 0.0..=1.0");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let scenario = generate_scenario(&config);
    let json = serde_json::to_string_pretty(&scenario).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} statement lines against {} invoices → {}",
            scenario.lines.len(),
            scenario.candidates.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "match" => cmd_match(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
