//! Sentry provider CLI binary.
//!
//! Operator tooling around the provider core: health checks, the type
//! catalog, and the id and JSON codecs.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use sentry_provider::cli::{Cli, Command};
use sentry_provider::id::{split_four_part_id, split_three_part_id, split_two_part_id};
use sentry_provider::types::LossyJson;
use sentry_provider::{logging, provider, ProviderConfig, SentryError, Value};

#[tokio::main]
async fn main() -> ExitCode {
    logging::try_init_logging_with_default("warn");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> sentry_provider::Result<()> {
    match cli.command {
        Command::Check { token, base_url } => handle_check(token, base_url, cli.json).await,
        Command::Resources => output_list(&provider::resource_type_names(), cli.json),
        Command::DataSources => output_list(&provider::data_source_type_names(), cli.json),
        Command::Schema {
            type_name,
            data_source,
        } => {
            let schema = if data_source {
                provider::data_source_schema(&type_name)
            } else {
                provider::resource_schema(&type_name)
            };
            let schema = schema.ok_or_else(|| SentryError::codec(format!("unknown type name: {type_name}")))?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::SplitId { id, parts } => handle_split_id(&id, &parts, cli.json),
        Command::DiffJson { given, current } => handle_diff_json(&given, &current, cli.json),
    }
}

async fn handle_check(token: Option<String>, base_url: Option<String>, json: bool) -> sentry_provider::Result<()> {
    let config = ProviderConfig {
        token: Value::from(token),
        base_url: Value::from(base_url),
    };
    match provider::configure(&config, None).await {
        Ok(client) => {
            if json {
                println!("{}", serde_json::json!({"ok": true, "base_url": client.base_url().as_str()}));
            } else {
                println!("OK: {}", client.base_url());
            }
            Ok(())
        }
        Err(diagnostic) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&diagnostic)?);
            }
            Err(SentryError::codec(diagnostic.to_string()))
        }
    }
}

fn handle_split_id(id: &str, names: &[String], json: bool) -> sentry_provider::Result<()> {
    let parts: Vec<String> = match names {
        [a, b] => {
            let (a, b) = split_two_part_id(id, a, b)?;
            vec![a, b]
        }
        [a, b, c] => {
            let (a, b, c) = split_three_part_id(id, a, b, c)?;
            vec![a, b, c]
        }
        [a, b, c, d] => {
            let (a, b, c, d) = split_four_part_id(id, a, b, c, d)?;
            vec![a, b, c, d]
        }
        _ => return Err(SentryError::codec("expected two to four part names")),
    };

    if json {
        let map: serde_json::Map<String, serde_json::Value> = names
            .iter()
            .cloned()
            .zip(parts.into_iter().map(serde_json::Value::String))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, part) in names.iter().zip(parts) {
            println!("{name:<16} {part}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DiffResult {
    equal: bool,
}

fn read_json(path: &Path) -> sentry_provider::Result<LossyJson> {
    let text = fs::read_to_string(path)
        .map_err(|e| SentryError::codec(format!("unable to read {}: {e}", path.display())))?;
    LossyJson::new(text)
}

fn handle_diff_json(given: &Path, current: &Path, json: bool) -> sentry_provider::Result<()> {
    let equal = read_json(given)?.semantic_eq(&read_json(current)?)?;
    if json {
        println!("{}", serde_json::to_string(&DiffResult { equal })?);
    } else if equal {
        println!("equal");
    } else {
        println!("different");
    }
    Ok(())
}

fn output_list(names: &[String], json: bool) -> sentry_provider::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}
