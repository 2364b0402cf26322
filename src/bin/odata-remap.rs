//! odata-remap — rewrite OData queries for a backend schema
//!
//! # Usage
//!
//! ```bash
//! # Remap with a profile from remap.toml
//! odata-remap "\$filter=Email eq 'x'&\$top=10" --entity Customers
//!
//! # Ad-hoc mapping, print the full backend URL
//! odata-remap "\$orderby=Name desc" -m Name=Cust_Name -d Phone --url -e Customers
//!
//! # Rename a backend payload back to client field names
//! curl -s "$URL" | odata-remap reverse -e Customers
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use odata_remap::parser::parse_query_with_limit;
use odata_remap::prelude::*;

#[derive(Parser)]
#[command(name = "odata-remap")]
#[command(version)]
#[command(about = "Rewrite OData queries onto a backend field schema", long_about = None)]
#[command(after_help = "EXAMPLES:
    odata-remap \"\\$filter=Email eq 'x' and Phone eq 'y'\" -e Customers
    odata-remap \"\\$orderby=Name desc&\\$top=5\" -m Name=Cust_Name --no-top
    odata-remap explain \"\\$filter=not Active\"
    odata-remap reverse response.json -e Customers")]
struct Cli {
    /// The OData query string to remap
    query: Option<String>,

    /// Mapping profile from the config file
    #[arg(short, long, global = true)]
    entity: Option<String>,

    /// Config file (default: ./remap.toml, then the user config directory)
    #[arg(short, long, global = true, env = "ODATA_REMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Extra rename pair, applied after the profile's pairs
    #[arg(short, long, value_name = "FROM=TO", global = true)]
    map: Vec<String>,

    /// Field whose clauses are removed from the query
    #[arg(short, long, value_name = "FIELD", global = true)]
    delete: Vec<String>,

    /// Do not forward $skip
    #[arg(long)]
    no_skip: bool,

    /// Do not forward $top
    #[arg(long)]
    no_top: bool,

    /// Do not forward $inlinecount
    #[arg(long)]
    no_count: bool,

    /// Read parsed query options as JSON instead of a query string
    #[arg(long, value_name = "FILE", conflicts_with = "query")]
    ast: Option<PathBuf>,

    /// Print the full backend URL instead of the query string
    #[arg(short, long)]
    url: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed tree and its translation
    Explain {
        /// The OData query string to explain
        query: String,
    },
    /// List the field mapping of an entity (or all entities)
    Fields,
    /// Rename backend JSON fields back to client names
    Reverse {
        /// JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config =
        RemapConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    match &cli.command {
        Some(Commands::Explain { query }) => explain_query(query, cli, &config),
        Some(Commands::Fields) => show_fields(cli, &config),
        Some(Commands::Reverse { file }) => reverse_payload(file.as_ref(), cli, &config),
        None => remap_query(cli, &config),
    }
}

/// Profile mapping plus ad-hoc `--map`/`--delete` and allow flags.
fn resolve_mapping(cli: &Cli, config: &RemapConfig) -> Result<(FieldMapping, Passthrough)> {
    let (mut mapping, mut allow) = match &cli.entity {
        Some(name) => {
            let entity = config.entity(name)?;
            (entity.mapping.clone(), entity.passthrough())
        }
        None => (FieldMapping::new(), Passthrough::default()),
    };

    let mut adhoc = FieldMapping::new();
    for pair in &cli.map {
        let (from, to) = pair
            .split_once('=')
            .with_context(|| format!("Invalid --map '{}', expected FROM=TO", pair))?;
        adhoc = adhoc.map(from.trim(), to.trim());
    }
    for field in &cli.delete {
        adhoc = adhoc.delete(field.trim());
    }
    mapping.extend(adhoc);

    if cli.no_skip {
        allow.skip = false;
    }
    if cli.no_top {
        allow.top = false;
    }
    if cli.no_count {
        allow.count = false;
    }
    Ok((mapping, allow))
}

fn remap_query(cli: &Cli, config: &RemapConfig) -> Result<()> {
    let options = match (&cli.query, &cli.ast) {
        (_, Some(path)) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<QueryOptions>(&content)
                .with_context(|| format!("Invalid query options JSON in {}", path.display()))?
        }
        (Some(query), None) => parse_query_with_limit(query, config.limits.max_depth)?,
        (None, None) => {
            println!("{}", "odata-remap — OData query rewriting".cyan().bold());
            println!();
            println!("Usage: odata-remap <QUERY> [OPTIONS]");
            println!();
            println!("Try: odata-remap --help");
            return Ok(());
        }
    };

    if cli.verbose {
        if let Some(query) = &cli.query {
            eprintln!("{} {}", "Input:".dimmed(), query.yellow());
        }
    }

    let (mapping, allow) = resolve_mapping(cli, config)?;
    let query = require_content(config.translator(&mapping).build_query(&options, allow)?)?;

    if cli.url {
        let entity = cli
            .entity
            .as_deref()
            .context("--url needs --entity to name the backend entity set")?;
        println!("{}", config.backend_url(entity, &query)?);
    } else {
        println!("{}", query);
    }
    Ok(())
}

fn explain_query(query: &str, cli: &Cli, config: &RemapConfig) -> Result<()> {
    println!("{}", "OData Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();

    let options = parse_query_with_limit(query, config.limits.max_depth)?;
    let (mapping, allow) = resolve_mapping(cli, config)?;
    let translator = config.translator(&mapping);

    if let Some(filter) = &options.filter {
        println!("{}", "Filter tree:".green().bold());
        println!("{:#?}", filter);
        println!();

        let raw = translator.translate(filter)?;
        let text = if raw.dropped {
            "(pruned)".dimmed().to_string()
        } else {
            raw.text.white().to_string()
        };
        println!("  {} {}", "Translated:".dimmed(), text);
        if let Some(node) = &raw.unsupported {
            println!("  {} {}", "Unsupported:".red(), node);
        }
    }

    if let Some(order) = &options.order {
        let keys: Vec<String> = order
            .iter()
            .map(|s| format!("{}{}", s.property, if s.descending { " desc" } else { "" }))
            .collect();
        println!("{} {}", "Order keys:".green().bold(), keys.join(", "));
        println!(
            "  {} {}",
            "Translated:".dimmed(),
            translator.translate_order(Some(order)).white()
        );
    }

    println!();
    match translator.build_query(&options, allow) {
        Ok(q) => {
            println!("{}", "Backend query:".green().bold());
            println!("  {}", q.white());
        }
        Err(e) => println!("{} {}", "Rejected:".red().bold(), e),
    }
    Ok(())
}

fn show_fields(cli: &Cli, config: &RemapConfig) -> Result<()> {
    let Some(name) = &cli.entity else {
        if config.entities.is_empty() {
            println!("{}", "(no entities configured)".dimmed());
        }
        for (name, entity) in &config.entities {
            println!(
                "{:20} {} pairs, {} deleted",
                name.cyan().bold(),
                entity.mapping.fields.len(),
                entity.mapping.delete.len()
            );
        }
        return Ok(());
    };

    let (mapping, allow) = resolve_mapping(cli, config)?;
    let width = mapping
        .fields
        .iter()
        .map(|p| p.from.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{}", name.cyan().bold());
    println!("{:width$}   {}", "From".white().bold(), "To".white().bold(), width = width);
    println!("{}", "─".repeat(width + 20).dimmed());

    let mut seen: Vec<&str> = Vec::new();
    for pair in &mapping.fields {
        let shadowed = seen.contains(&pair.from.as_str());
        let line = format!("{:width$} → {}", pair.from, pair.to, width = width);
        if shadowed {
            println!("{} {}", line.dimmed(), "(shadowed by earlier pair)".yellow());
        } else {
            println!("{}", line);
            seen.push(pair.from.as_str());
        }
    }

    if !mapping.delete.is_empty() {
        println!();
        let deleted: Vec<&str> = mapping.delete.iter().map(String::as_str).collect();
        println!("{} {}", "Deleted:".red(), deleted.join(", "));
    }

    println!();
    println!(
        "{} skip={} top={} count={}",
        "Passthrough:".dimmed(),
        allow.skip,
        allow.top,
        allow.count
    );
    Ok(())
}

fn reverse_payload(file: Option<&PathBuf>, cli: &Cli, config: &RemapConfig) -> Result<()> {
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let payload: serde_json::Value =
        serde_json::from_str(&content).context("Backend payload is not valid JSON")?;
    let (mapping, _) = resolve_mapping(cli, config)?;
    let renamed = mapping.map_payload_back(payload)?;
    println!("{}", serde_json::to_string_pretty(&renamed)?);
    Ok(())
}
