//! pubmanifest - Publication manifest processor

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use pubmanifest::{Error, FileFetcher, Processor, Toc, discover, load_toc};

#[derive(Parser)]
#[command(name = "pubmanifest")]
#[command(version, about = "Publication manifest processor", long_about = None)]
#[command(after_help = "EXAMPLES:
    pubmanifest book/pub.json              Validate a manifest
    pubmanifest book/index.html --toc      Discover the manifest and extract the ToC
    pubmanifest book/pub.json --json       Print the processed manifest as JSON")]
struct Cli {
    /// Manifest (JSON) or HTML entry page, as a path or file:// URL
    #[arg(value_name = "INPUT")]
    input: String,

    /// Base URL for relative URLs (defaults to the manifest location)
    #[arg(short, long, value_name = "URL")]
    base: Option<Url>,

    /// Extract the table of contents
    #[arg(short, long)]
    toc: bool,

    /// Print the processed manifest and diagnostics as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// Log processing stages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether processing succeeded without a fatal error.
fn run(cli: &Cli) -> Result<bool, Error> {
    let address = input_url(&cli.input)?;
    let mut source = discover(&address, &FileFetcher)?;
    if let Some(base) = &cli.base {
        source.base = Some(base.clone());
    }

    let mut result = Processor::new().process(&source);
    let toc = if cli.toc {
        load_toc(
            &result.manifest,
            source.document.as_ref(),
            &FileFetcher,
            &mut result.logger,
        )
    } else {
        None
    };
    let succeeded = !result.logger.has_fatal();

    if cli.json {
        let output = serde_json::json!({
            "manifest": result.manifest,
            "toc": toc,
            "diagnostics": result.logger,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(succeeded);
    }

    if cli.quiet {
        return Ok(succeeded);
    }

    for (severity, diagnostic) in result.logger.iter() {
        eprintln!("{severity}: {diagnostic}");
    }
    if succeeded {
        print_summary(&address, &result.manifest, cli.toc.then_some(toc.as_ref()));
    }
    Ok(succeeded)
}

fn input_url(input: &str) -> Result<Url, Error> {
    if let Ok(url) = Url::parse(input)
        && url.scheme().len() > 1
    {
        return Ok(url);
    }
    let path = std::path::absolute(Path::new(input))?;
    Url::from_file_path(&path).map_err(|()| Error::UnsupportedScheme(input.to_string()))
}

fn print_summary(address: &Url, manifest: &pubmanifest::Manifest, toc: Option<Option<&Toc>>) {
    println!("Source: {address}");
    let names = manifest.name();
    if !names.is_empty() {
        println!("Name: {}", names.join(" / "));
    }
    if let Some(id) = manifest.id() {
        println!("Id: {id}");
    }
    println!("Type: {}", manifest.types().join(", "));
    if let Some(direction) = manifest.reading_progression() {
        println!("Reading progression: {}", direction.as_str());
    }
    println!("Reading order: {}", manifest.reading_order().len());
    println!("Resources: {}", manifest.resources().len());
    println!("Links: {}", manifest.links().len());
    if let Some(toc) = toc {
        println!("TOC entries: {}", toc.map_or(0, Toc::len));
    }
}
