//! Command-line interface for rdtree
//!
//! Usage:
//!   rdtree parse --grammar `<file>` [--start `<rule>`] [--format `<format>`] [--config `<file>`] `<path|->`
//!   rdtree check --grammar `<file>` [--start `<rule>`]
//!   rdtree list-formats

use clap::{Arg, ArgAction, ArgMatches, Command};
use rdtree::config::{Loader, RdtreeConfig};
use rdtree::formats::{FormatRegistry, PrettyTagFormatter};
use rdtree::Parser;
use std::error::Error;
use std::io::Read;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `-v` raises the default level, `RUST_LOG` takes precedence
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .long("grammar")
        .short('g')
        .help("Path to the grammar file")
        .required(true)
}

fn start_arg() -> Arg {
    Arg::new("start")
        .long("start")
        .short('s')
        .help("Rule to start parsing from (default: parse)")
}

fn main() {
    let matches = Command::new("rdtree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse text with a recursive-descent grammar and print the rule tree")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log grammar compilation and matching to stderr (repeat for more; RUST_LOG overrides)"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a file and print its rule tree")
                .arg(
                    Arg::new("path")
                        .help("Input file, or - for stdin")
                        .default_value("-")
                        .index(1),
                )
                .arg(grammar_arg())
                .arg(start_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (see list-formats)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("TOML file layered over the built-in defaults"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Compile a grammar and list its rules")
                .arg(grammar_arg())
                .arg(start_arg()),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    init_tracing(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("parse", parse_matches)) => handle_parse_command(parse_matches),
        Some(("check", check_matches)) => handle_check_command(check_matches),
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => unreachable!(),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(matches: &ArgMatches) -> Result<RdtreeConfig, Box<dyn Error>> {
    let mut loader = Loader::new();
    if let Some(path) = matches.try_get_one::<String>("config").ok().flatten() {
        loader = loader.with_file(path);
    }
    if let Some(start) = matches.get_one::<String>("start") {
        loader = loader.set_override("parser.start_rule", start.as_str())?;
    }
    if let Some(format) = matches.try_get_one::<String>("format").ok().flatten() {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    Ok(loader.build()?)
}

fn read_grammar(matches: &ArgMatches) -> Result<String, Box<dyn Error>> {
    let path = matches
        .get_one::<String>("grammar")
        .ok_or("missing --grammar")?;
    std::fs::read_to_string(path).map_err(|e| format!("cannot read grammar {}: {}", path, e).into())
}

fn read_input(path: &str) -> Result<String, Box<dyn Error>> {
    if path == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e).into())
    }
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches) -> Result<String, Box<dyn Error>> {
    let config = load_config(matches)?;
    let grammar = read_grammar(matches)?;
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-");
    let input = read_input(path)?;

    let parser = Parser::new(&grammar, config.parser)?;
    let tree = parser.parse(&input)?;

    let mut registry = FormatRegistry::with_defaults();
    registry.register(PrettyTagFormatter {
        indent: config.output.indent,
    });
    let mut output = registry.serialize(&tree, &config.output.format)?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches) -> Result<String, Box<dyn Error>> {
    let config = load_config(matches)?;
    let grammar = read_grammar(matches)?;
    let parser = Parser::new(&grammar, config.parser)?;

    let compiled = parser.grammar();
    let mut output = format!(
        "Grammar OK: {} rules, start rule '{}'\n",
        compiled.rules().len(),
        compiled.start_rule()
    );
    for name in compiled.rule_names() {
        output.push_str(&format!("  {}\n", name));
    }
    Ok(output)
}

/// Handle the list-formats command
fn handle_list_formats_command() -> Result<String, Box<dyn Error>> {
    let registry = FormatRegistry::with_defaults();
    let mut output = String::from("Available formats:\n\n");
    for name in registry.list_formats() {
        let description = registry
            .get(&name)
            .map(|f| f.description())
            .unwrap_or_default();
        output.push_str(&format!("  {:<12} {}\n", name, description));
    }
    Ok(output)
}
