use anyhow::{anyhow, Error, Result};
use clap::{Parser, Subcommand};
use log::info;
use quadstore::io::{read_file, write_nquads};
use quadstore::{BlankNode, DataFactory, Literal, NamedNode, Store, StoreConfig, Term, Variable};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "quadstore")]
#[command(about = "Load, query and dump RDF quads with an in-memory quad store")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// Strict mode - fail on the first statement that cannot be loaded instead of skipping it
    #[clap(long, action, default_value = "false", global = true)]
    strict: bool,
    /// Store configuration file (JSON), defaults to the built-in configuration
    #[clap(long = "config", short = 'c', global = true)]
    config_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load RDF files into a store and print how many quads each graph holds
    Load {
        /// Files to load; the syntax is guessed from the extension
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the quads matching a pattern. Terms are written as <iri>, _:label,
    /// "literal", "literal"@lang, "literal"^^<datatype>, ?variable or DEFAULT
    Match {
        #[clap(required = true)]
        files: Vec<PathBuf>,
        #[clap(long, short)]
        subject: Option<String>,
        #[clap(long, short)]
        predicate: Option<String>,
        #[clap(long, short)]
        object: Option<String>,
        #[clap(long, short)]
        graph: Option<String>,
        /// Only print the number of matching quads
        #[clap(long, action, default_value = "false")]
        count: bool,
    },
    /// Merge RDF files and write the deduplicated quads as N-Quads
    Dump {
        #[clap(required = true)]
        files: Vec<PathBuf>,
        /// The file to write to, defaults to stdout
        #[clap(long)]
        output: Option<PathBuf>,
        /// Leave out all quads of this graph
        #[clap(long)]
        without_graph: Option<String>,
    },
    /// Print the effective store configuration
    Config {
        /// Save the configuration to this file instead of printing it
        #[clap(long)]
        write: Option<PathBuf>,
    },
}

/// Undoes the escaping `Literal` applies when printed.
fn unescape_literal(s: &str) -> Result<String> {
    let mut value = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => value.push('"'),
            Some('\\') => value.push('\\'),
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some(other) => return Err(anyhow!("unknown escape \\{} in literal", other)),
            None => return Err(anyhow!("literal ends with a lone backslash")),
        }
    }
    Ok(value)
}

/// Parses a term as written on the command line. Anything that is not
/// recognized as another kind of term is taken as an IRI.
fn parse_term(s: &str, factory: &DataFactory) -> Result<Term> {
    let s = s.trim();
    if s == quadstore::DEFAULT_GRAPH_VALUE {
        return Ok(Term::DefaultGraph);
    }
    if let Some(label) = s.strip_prefix("_:") {
        return Ok(BlankNode::new(label, factory).into());
    }
    if s.starts_with('?') {
        return Ok(Variable::new(s)?.into());
    }
    if let Some(rest) = s.strip_prefix('"') {
        let end = rest
            .rfind('"')
            .ok_or_else(|| anyhow!("unterminated literal: {}", s))?;
        let (lexical, suffix) = (unescape_literal(&rest[..end])?, &rest[end + 1..]);
        let literal = if suffix.is_empty() {
            Literal::new_string(lexical, None)
        } else if let Some(language) = suffix.strip_prefix('@') {
            Literal::new(lexical, Some(language), None)
        } else if let Some(datatype) = suffix.strip_prefix("^^") {
            Literal::new(lexical, None, Some(NamedNode::new(datatype)))
        } else {
            return Err(anyhow!("unexpected text after literal: {}", suffix));
        };
        return Ok(literal.into());
    }
    Ok(NamedNode::new(s).into())
}

fn parse_optional_term(s: Option<&str>, factory: &DataFactory) -> Result<Option<Term>> {
    s.map(|s| parse_term(s, factory)).transpose()
}

fn load_store(files: &[PathBuf], config: &StoreConfig, strict: bool) -> Result<Store> {
    let store = Store::with_config(config.clone());
    for file in files {
        let stream = read_file(file, None, config.import_capacity)?;
        let added = if strict {
            store
                .try_import(stream)
                .map_err(|e| anyhow!("failed to load {}: {}", file.display(), e))?
        } else {
            store.import(stream)
        };
        info!("Loaded {} new quads from {}", added, file.display());
    }
    Ok(store)
}

fn graph_counts(store: &Store) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    store.for_each(|quad| {
        *counts.entry(quad.graph().to_string()).or_insert(0) += 1;
    });
    counts
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    match path {
        Some(path) => StoreConfig::from_file(path)
            .map_err(|e| anyhow!("failed to read config {}: {}", path.display(), e)),
        None => Ok(StoreConfig::default()),
    }
}

pub fn run() -> Result<()> {
    quadstore::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    quadstore::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn execute(cmd: Cli) -> Result<()> {
    // RUST_LOG may already come from QUADSTORE_LOG; the flags win over both.
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let config = load_config(cmd.config_file.as_deref())?;
    if cmd.verbose || cmd.debug {
        config.print();
    }

    match cmd.command {
        Commands::Load { files } => {
            let store = load_store(&files, &config, cmd.strict)?;
            println!("Loaded {} quads", store.size());
            for (graph, count) in graph_counts(&store) {
                println!("{}\t{}", graph, count);
            }
        }
        Commands::Match {
            files,
            subject,
            predicate,
            object,
            graph,
            count,
        } => {
            let factory = DataFactory::new();
            let subject = parse_optional_term(subject.as_deref(), &factory)?;
            let predicate = parse_optional_term(predicate.as_deref(), &factory)?;
            let object = parse_optional_term(object.as_deref(), &factory)?;
            let graph = parse_optional_term(graph.as_deref(), &factory)?;
            let store = load_store(&files, &config, cmd.strict)?;
            let matches = store.match_quads(
                subject.as_ref(),
                predicate.as_ref(),
                object.as_ref(),
                graph.as_ref(),
            );
            if count {
                println!("{}", matches.count());
            } else {
                let mut lines: Vec<String> = matches.map(|q| q.to_canonical_string()).collect();
                lines.sort();
                for line in lines {
                    println!("{}", line);
                }
            }
        }
        Commands::Dump {
            files,
            output,
            without_graph,
        } => {
            let without_graph =
                parse_optional_term(without_graph.as_deref(), &DataFactory::new())?;
            let store = load_store(&files, &config, cmd.strict)?;
            if let Some(graph) = without_graph {
                let removed = store.delete_graph(&graph);
                info!("Removed {} quads of graph {}", removed, graph);
            }
            let quads = store.match_quads(None, None, None, None);
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    let mut writer = BufWriter::new(file);
                    let written = write_nquads(quads, &mut writer)?;
                    writer.flush()?;
                    written
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    write_nquads(quads, &mut handle)?
                }
            };
            info!("Wrote {} quads", written);
        }
        Commands::Config { write } => match write {
            Some(path) => {
                config.save_to_file(&path)?;
                println!("Saved configuration to {}", path.display());
            }
            None => config.print(),
        },
    }

    Ok(())
}
