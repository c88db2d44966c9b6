use infinite_rules::bot::RandomBot;
use infinite_rules::chess::variants;
use infinite_rules::notation::{encode, IcnOptions, Metadata};
use infinite_rules::{EngineConfig, GameState};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: random_game [--variant NAME] [--plies N] [--seed S] [--multiline]";

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => {
            eprintln!("{flag} needs a value\n{USAGE}");
            std::process::exit(2);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut variant = variants::CLASSICAL.to_string();
    let mut plies: usize = 200;
    let mut seed: Option<u64> = None;
    let mut opts = IcnOptions::default();

    let mut it = args.iter();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--variant" => variant = parse_value("--variant", it.next()),
            "--plies" => plies = parse_value("--plies", it.next()),
            "--seed" => seed = Some(parse_value("--seed", it.next())),
            "--multiline" => opts.multiline = true,
            _ => {
                eprintln!("{USAGE}");
                std::process::exit(2);
            }
        }
    }

    let metadata = Metadata {
        white: Some("RandomBot".to_string()),
        black: Some("RandomBot".to_string()),
        utc_date: Some(chrono::Utc::now().format("%Y.%m.%d").to_string()),
        utc_time: Some(chrono::Utc::now().format("%H:%M:%S").to_string()),
        ..Metadata::default()
    };
    let mut game = match GameState::from_variant(&variant, metadata, EngineConfig::default()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{e}; known variants: {}", variants::NAMES.join(", "));
            std::process::exit(2);
        }
    };

    let mut bot = match seed {
        Some(s) => RandomBot::new(s),
        None => RandomBot::from_entropy(),
    };
    for _ in 0..plies {
        let Some(draft) = bot.pick(&game) else {
            break;
        };
        if let Err(e) = game.make_move(draft) {
            eprintln!("Bot produced an illegal move: {e}");
            std::process::exit(1);
        }
    }

    match encode(&game.to_long_format(), &opts) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to render: {e}");
            std::process::exit(1);
        }
    }
    if let Some(c) = game.conclusion() {
        eprintln!("{c}");
    }
}
