//! xmlext command-line tool
//!
//! Translate CSS selectors to XPath 1.0 and run them against HTML or XML
//! documents.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use xmlext::css::{CompoundTerm, parse_selector};
use xmlext::{Document, NodeRef, css2xpath};

/// CSS selector to XPath translator and document search
#[derive(Parser, Debug)]
#[command(name = "xmlext")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Compile selectors to XPath
    xmlext translate 'div.post p' '#main'

    # Show the parsed compound terms as JSON
    xmlext parse 'ul.nav li.current' --json

    # Search a file
    xmlext search '.commentlist_alt' page.html

    # Search inline markup, count only
    xmlext search p --html '<p>a</p><p>b</p>' --count

    # Run raw XPath against an XML file
    xmlext search --xml --xpath '//item[@id]' feed.xml
"#)]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the XPath expression for each selector
    Translate {
        /// Selectors to compile
        #[arg(required = true, value_name = "SELECTOR")]
        selectors: Vec<String>,
    },

    /// Print the compound terms of a selector
    Parse {
        /// Selector to parse
        selector: String,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Print the nodes a selector matches in a document
    Search {
        /// CSS selector, or an XPath expression with --xpath
        selector: String,

        /// Document to search
        #[arg(value_name = "FILE", required_unless_present = "html")]
        path: Option<PathBuf>,

        /// Search this markup instead of a file
        #[arg(long, value_name = "MARKUP", conflicts_with = "path")]
        html: Option<String>,

        /// Parse the document as XML instead of HTML
        #[arg(long)]
        xml: bool,

        /// Treat SELECTOR as an XPath expression
        #[arg(long)]
        xpath: bool,

        /// Print only the number of matches
        #[arg(long)]
        count: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            for cause in err.chain().skip(1) {
                eprintln!("  {} {cause}", "caused by:".yellow());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Translate { selectors } => {
            for selector in &selectors {
                let xpath = css2xpath(selector)
                    .with_context(|| format!("cannot translate {selector:?}"))?;
                println!("{xpath}");
            }
        }
        Command::Parse { selector, json } => {
            let parsed = parse_selector(&selector)
                .with_context(|| format!("cannot parse {selector:?}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                for (i, term) in parsed.terms().iter().enumerate() {
                    println!("{:>3}  {}", (i + 1).dimmed(), describe(term));
                }
            }
        }
        Command::Search {
            selector,
            path,
            html,
            xml,
            xpath,
            count,
        } => {
            let source = match (html, path) {
                (Some(markup), _) => markup,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.display()))?,
                (None, None) => bail!("a FILE or --html is required"),
            };
            let doc = if xml {
                Document::parse_xml(&source).context("document is not well-formed XML")?
            } else {
                Document::parse_html(&source).context("cannot parse HTML")?
            };

            let matches = if xpath {
                doc.find(&selector)
                    .with_context(|| format!("cannot evaluate {selector:?}"))?
            } else {
                doc.search(&selector)
                    .with_context(|| format!("cannot search for {selector:?}"))?
            };
            tracing::debug!(matches = matches.len(), "search finished");
            print_matches(&matches, count);
        }
    }
    Ok(())
}

fn print_matches(matches: &[NodeRef<'_>], count: bool) {
    if count {
        println!("{}", matches.len());
        return;
    }
    for node in matches {
        println!("{node}");
    }
}

/// `div .a .b #x` style listing of one compound term.
fn describe(term: &CompoundTerm) -> String {
    let element = term.element.as_deref().unwrap_or("*");
    let mut parts = vec![element.bold().to_string()];
    parts.extend(term.classes.iter().map(|c| format!(".{c}").green().to_string()));
    if let Some(id) = &term.id {
        parts.push(format!("#{id}").cyan().to_string());
    }
    parts.join(" ")
}
