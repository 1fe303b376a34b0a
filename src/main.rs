use clap::Parser;
use std::io;
use std::path::PathBuf;

use eclipse_finder::catalog::EclipseKind;
use eclipse_finder::config::{Overrides, Settings};
use eclipse_finder::finder::{parse_reference_date, today_in, EclipseFinder};
use eclipse_finder::location::LocationNormalizer;
use eclipse_finder::server::{self, AppState};
use eclipse_finder::{logging, report};

/// Eclipse Finder: next solar and lunar eclipse for any location
///
/// Accepts "City, Region, Country", a bare country or continent, a U.S. ZIP
/// code or a Canadian postal code. Answers from an offline catalog.
///
/// Examples:
///   eclipse "Toronto, ON, Canada"
///   eclipse 78701 --date 2027-01-01
///   eclipse --location "Madrid, Spain" --kind solar --json
///   eclipse --serve --port 8080
#[derive(Parser)]
#[command(name = "eclipse", version, about, long_about = None)]
struct Cli {
    /// Location (positional). Example: eclipse "Austin, TX"
    #[arg(index = 1)]
    location_positional: Option<String>,

    /// Location (named). Example: --location "Reykjavik, Iceland"
    #[arg(long, short = 'l')]
    location: Option<String>,

    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, short = 'd')]
    date: Option<String>,

    /// IANA time zone used for "today" (e.g. America/Toronto).
    #[arg(long)]
    tz: Option<String>,

    /// Only look up one kind: "solar" or "lunar".
    #[arg(long, short = 'k')]
    kind: Option<EclipseKind>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Directory holding the catalog CSV files.
    #[arg(long)]
    catalog_dir: Option<PathBuf>,

    /// Region tables JSON replacing the built-in gazetteer.
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Log filter (e.g. debug, eclipse_finder=trace).
    #[arg(long)]
    log: Option<String>,

    /// Start the HTTP server instead of answering one query.
    #[arg(long)]
    serve: bool,

    /// Server bind address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, short = 'p', default_value_t = 3000)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref(), if cli.serve { "info" } else { "warn" });

    // ── Settings and data ───────────────────────────────────────

    let overrides = Overrides {
        catalog_dir: cli.catalog_dir.clone(),
        regions_file: cli.regions.clone(),
        tz: cli.tz.clone(),
    };
    let settings = Settings::resolve(&overrides).unwrap_or_else(|e| fail(e));
    let tables = settings.region_tables().unwrap_or_else(|e| fail(e));
    let catalog = settings.load_catalog().unwrap_or_else(|e| fail(e));
    let finder = EclipseFinder::new(LocationNormalizer::new(tables), catalog);

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
        let state = AppState { finder, tz: settings.tz };
        if let Err(e) = runtime.block_on(server::start(state, &cli.host, cli.port)) {
            fail(format!("Cannot serve on {}:{}: {}", cli.host, cli.port, e));
        }
        return;
    }

    // ── One-shot lookup ─────────────────────────────────────────

    let kinds: Vec<EclipseKind> = match cli.kind {
        Some(kind) => vec![kind],
        None => EclipseKind::ALL.to_vec(),
    };

    let report = match cli.location.clone().or(cli.location_positional.clone()) {
        Some(raw) => finder
            .lookup_str(&raw, cli.date.as_deref(), today_in(settings.tz), &kinds)
            .unwrap_or_else(|e| fail(e)),
        None => {
            let reference = parse_reference_date(cli.date.as_deref(), today_in(settings.tz)).unwrap_or_else(|e| fail(e));
            match finder.prompt_lookup(io::stdin().lock(), io::stderr(), reference, &kinds) {
                Ok(Some(report)) => report,
                Ok(None) => fail("No location given."),
                Err(e) => fail(e),
            }
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
    } else {
        print!("{}", report::render_text(&report));
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}
