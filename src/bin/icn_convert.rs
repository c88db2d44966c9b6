use std::io::Read;
use std::path::Path;

use infinite_rules::notation::{encode, parse_any, IcnOptions};
use infinite_rules::{EngineConfig, GameState};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: icn_convert <file|-> [--json|--icn] [--compact] [--multiline] \
                     [--no-position] [--config <engine.json>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Json,
    Icn,
}

fn read_input(arg: &str) -> Result<String, String> {
    if arg == "-" {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        Ok(s)
    } else {
        std::fs::read_to_string(arg).map_err(|e| format!("Failed to read {arg}: {e}"))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut input = None;
    let mut output = None;
    let mut opts = IcnOptions::default();
    let mut config = EngineConfig::default();

    let mut it = args.iter();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--json" => output = Some(Output::Json),
            "--icn" => output = Some(Output::Icn),
            "--compact" => opts.compact = true,
            "--multiline" => opts.multiline = true,
            "--no-position" => opts.omit_variant_position = true,
            "--config" => {
                let Some(path) = it.next() else {
                    eprintln!("{USAGE}");
                    std::process::exit(2);
                };
                config = match EngineConfig::load(Path::new(path)) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("{e}");
                        std::process::exit(2);
                    }
                };
            }
            other if input.is_none() && (other == "-" || !other.starts_with('-')) => {
                input = Some(other.to_string());
            }
            _ => {
                eprintln!("{USAGE}");
                std::process::exit(2);
            }
        }
    }
    let Some(input) = input else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let text = match read_input(&input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let is_json = text.trim_start().starts_with('{');
    let output = output.unwrap_or(if is_json { Output::Icn } else { Output::Json });

    let parsed = match parse_any(&text) {
        Ok(lf) => lf,
        Err(e) => {
            eprintln!("Invalid game: {e}");
            std::process::exit(2);
        }
    };
    // Replaying validates every move and fills in check marks and the result.
    let game = match GameState::from_long_format(&parsed, config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Game does not replay: {e}");
            std::process::exit(2);
        }
    };
    let mut lf = game.to_long_format();
    if parsed.starting_position.is_none() {
        lf.starting_position = None;
        lf.special_rights.clear();
    }

    let rendered = match output {
        Output::Json => lf.to_json_pretty(),
        Output::Icn => encode(&lf, &opts),
    };
    match rendered {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to render: {e}");
            std::process::exit(1);
        }
    }
}
