mod config;
mod enrichment;
mod error;
mod llm;
mod pipeline;
mod profile;
mod resolver;
mod search;
mod selector;
mod summary;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::profile::ProfileCandidate;
use crate::selector::CandidateChooser;

const DEFAULT_CONFIG_PATH: &str = "config/ice-breaker.toml";

fn print_help() {
    println!(
        "\
ice-breaker v{}

Looks up a person's professional profile and drafts a short summary,
interesting facts and conversation openers.

USAGE:
    ice-breaker [OPTIONS] <NAME>

ARGUMENTS:
    NAME    Full name of the person to look up

OPTIONS:
    -c, --config <PATH>    Path to TOML configuration file [default: {DEFAULT_CONFIG_PATH}]
    -u, --url <URL>        Skip resolution and summarize this profile URL
        --candidates       Only list the profile candidates for NAME
    -i, --interactive      Ask on the terminal when NAME is ambiguous
        --offline          Use the canned enrichment fixture instead of the live API
    -h, --help             Print this help message and exit
    -V, --version          Print version and exit

ENVIRONMENT VARIABLES:
    Variables are referenced in the config file via ${{VAR_NAME}} syntax.

    RUST_LOG              Log level filter for tracing
                          (e.g. debug, ice_breaker=debug,warn)
    ANTHROPIC_API_KEY     API key for Anthropic Claude models
    TAVILY_API_KEY        API key for Tavily web search
                          (from https://tavily.com)
    SCRAPIN_API_KEY       API key for the Scrapin enrichment API
                          (from https://scrapin.io)

EXAMPLES:
    ice-breaker \"Jane Doe\"
    ice-breaker --interactive \"Jane Doe\"
    ice-breaker --url https://www.linkedin.com/in/jane-doe
    RUST_LOG=debug ice-breaker --offline \"Jane Doe\"",
        env!("CARGO_PKG_VERSION"),
    );
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config_path: Option<String>,
    name: Option<String>,
    url: Option<String>,
    candidates_only: bool,
    interactive: bool,
    offline: bool,
}

enum Command {
    Run(Args),
    Help,
    Version,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let mut parsed = Args::default();
    let mut words: Vec<String> = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--config" | "-c" => match args.next() {
                Some(path) => parsed.config_path = Some(path),
                None => bail!("{arg} requires a path"),
            },
            "--url" | "-u" => match args.next() {
                Some(url) => parsed.url = Some(url),
                None => bail!("{arg} requires a URL"),
            },
            "--candidates" => parsed.candidates_only = true,
            "--interactive" | "-i" => parsed.interactive = true,
            "--offline" => parsed.offline = true,
            flag if flag.starts_with('-') => bail!("Unknown option: {flag}"),
            _ => words.push(arg),
        }
    }

    if !words.is_empty() {
        parsed.name = Some(words.join(" "));
    }
    if parsed.name.is_none() && parsed.url.is_none() {
        bail!("Missing NAME (see --help)");
    }
    if parsed.candidates_only && parsed.name.is_none() {
        bail!("--candidates requires a NAME");
    }

    Ok(Command::Run(parsed))
}

/// Lists the candidates on stderr and reads a number from stdin.
struct StdinChooser;

impl CandidateChooser for StdinChooser {
    fn choose(&self, candidates: &[ProfileCandidate]) -> Option<usize> {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "Several profiles match:");
        for (i, candidate) in candidates.iter().enumerate() {
            let _ = writeln!(
                stderr,
                "  [{}] {} - {}\n      {}",
                i + 1,
                candidate.display_name,
                candidate.preview,
                candidate.url
            );
        }
        let _ = write!(stderr, "Pick one (1-{}, empty to cancel): ", candidates.len());
        let _ = stderr.flush();

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        parse_choice(&line, candidates.len())
    }
}

/// 1-based menu answer → 0-based index.
fn parse_choice(line: &str, count: usize) -> Option<usize> {
    match line.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

async fn run(args: Args) -> Result<serde_json::Value> {
    let config_path = args.config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    info!("Loading configuration from {config_path}");
    let config = Config::load(config_path)?;

    let offline = args.offline || config.enrichment.offline;
    let pipeline = Pipeline::from_config(&config, offline)?;

    if args.candidates_only {
        let name = args.name.unwrap_or_default();
        let candidates = pipeline.resolve_candidates(&name).await;
        return Ok(serde_json::to_value(candidates)?);
    }

    let (summary, photo_url) = match (args.url, args.name) {
        (Some(url), _) => pipeline.enrich_and_summarize(&url).await?,
        (None, Some(name)) if args.interactive => {
            pipeline.lookup_with_chooser(&name, &StdinChooser).await?
        }
        (None, Some(name)) => pipeline.lookup_and_summarize(&name).await?,
        (None, None) => bail!("Missing NAME (see --help)"),
    };

    Ok(json!({ "summary": summary, "photoUrl": photo_url }))
}

#[tokio::main]
async fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return;
        }
        Ok(Command::Version) => {
            println!("ice-breaker v{}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    // Logs go to stderr; stdout carries only the JSON result
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ice_breaker=info")),
        )
        .init();

    match run(args).await {
        Ok(output) => println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default()),
        Err(e) => {
            error!("{e:#}");
            println!("{}", json!({ "error": format!("{e:#}") }));
            std::process::exit(1);
        }
    }
}
