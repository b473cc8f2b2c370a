use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use shelfscan_core::{decode_payload, normalize_payload, process_scan_with_window, Catalog, ScanRecord};
use shelfscan_ingest::{parse_catalog_csv, CatalogOptions};
use std::fs;
use std::path::PathBuf;

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "shelfscan",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SHELFSCAN_BUILD_SHA"), ")"),
    about = "Decode GS1 barcode payloads and match them against a product catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode, classify and match one or more payloads
    Scan {
        /// Raw or bracketed payloads, e.g. "(01)06297000001234(17)250630"
        #[arg(required = true)]
        payloads: Vec<String>,

        /// Catalog CSV/TSV (defaults to [catalog] path in config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Override today's date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Print JSON records instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the bracketed form of a raw payload
    Decode {
        payload: String,
    },

    /// Scan every line of a file and write JSON Lines records to stdout
    Batch {
        /// File with one payload per line
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Catalog inspection
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Manage ~/.shelfscan/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Row counts and last-8 collisions for a catalog file
    Stats {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must keep working when the file itself is broken.
    if let Command::Config { command } = &cli.command {
        return run_config(command);
    }

    let cfg = config::load_config()?;
    init_logging(&cfg.log.level);

    match cli.command {
        Command::Scan {
            payloads,
            catalog,
            today,
            json,
        } => {
            let cat = load_catalog(catalog, &cfg)?;
            let today = resolve_today(today, &cfg)?;
            let snap = cat.snapshot();

            for payload in &payloads {
                let rec = process_scan_with_window(
                    payload,
                    &snap.index,
                    today,
                    cfg.expiry.soon_window_days,
                );
                if json {
                    println!("{}", serde_json::to_string_pretty(&rec)?);
                } else {
                    print_record(&rec);
                }
            }
        }

        Command::Decode { payload } => {
            let decoded = decode_payload(&normalize_payload(&payload));
            println!("{}", decoded.text);
            if decoded.skipped_chars > 0 {
                println!("(skipped {} unrecognized character(s))", decoded.skipped_chars);
            }
        }

        Command::Batch {
            input,
            catalog,
            today,
        } => {
            run_batch(input, catalog, today, &cfg)?;
        }

        Command::Catalog { command } => match command {
            CatalogCommand::Stats { catalog } => {
                let path = catalog_path(catalog, &cfg)?;
                let report = parse_catalog_csv(&path, &catalog_options(&cfg)?)?;
                let cat = Catalog::new();
                cat.load(report.products());
                let snap = cat.snapshot();

                println!("Catalog: {}", path.display());
                println!("Rows kept: {}", report.rows.len());
                println!("Rows dropped: {}", report.dropped);
                println!("Header row: {}", if report.header_skipped { "yes" } else { "no" });
                println!("Exact keys: {}", snap.index.exact_len());
                println!("Last-8 suffixes shared by several GTINs: {}", snap.index.last8_collisions());
            }
        },

        // Handled before the config load.
        Command::Config { .. } => {}
    }

    Ok(())
}

fn run_config(command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => {
            init_logging("info");
            config::init_config()
        }
        ConfigCommand::Show => {
            let path = config::config_path()?;
            let (cfg, err) = config::load_config_lenient(&path);
            init_logging(&cfg.log.level);
            if let Some(e) = err {
                warn!("{e:#}; showing defaults");
            }
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            Ok(())
        }
    }
}

fn catalog_options(cfg: &Config) -> Result<CatalogOptions> {
    Ok(CatalogOptions {
        delimiter: cfg.catalog.delimiter_byte()?,
    })
}

fn catalog_path(arg: Option<PathBuf>, cfg: &Config) -> Result<PathBuf> {
    let Some(path) = arg.or_else(|| cfg.catalog.path.clone()) else {
        bail!("no catalog given (pass --catalog <file> or set [catalog] path in config)");
    };
    if !path.exists() {
        bail!("catalog not found: {}", path.display());
    }
    Ok(path)
}

/// Catalog from `--catalog` or config; empty (every match is NONE) when neither is set.
fn load_catalog(arg: Option<PathBuf>, cfg: &Config) -> Result<Catalog> {
    let cat = Catalog::new();
    if arg.is_none() && cfg.catalog.path.is_none() {
        warn!("no catalog configured; every scan will match NONE");
        return Ok(cat);
    }

    let path = catalog_path(arg, cfg)?;
    let report = parse_catalog_csv(&path, &catalog_options(cfg)?)?;
    let generation = cat.load(report.products());
    info!(
        "loaded {} catalog rows from {} (generation {generation})",
        report.rows.len(),
        path.display()
    );
    Ok(cat)
}

fn resolve_today(arg: Option<NaiveDate>, cfg: &Config) -> Result<NaiveDate> {
    match arg {
        Some(d) => Ok(d),
        None => cfg.expiry.today(),
    }
}

fn run_batch(
    input: PathBuf,
    catalog: Option<PathBuf>,
    today: Option<NaiveDate>,
    cfg: &Config,
) -> Result<()> {
    let text = fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let cat = load_catalog(catalog, cfg)?;
    let today = resolve_today(today, cfg)?;
    let snap = cat.snapshot();

    let mut count = 0usize;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let rec = process_scan_with_window(line, &snap.index, today, cfg.expiry.soon_window_days);
        println!("{}", serde_json::to_string(&rec)?);
        count += 1;
    }
    info!("wrote {count} records from {}", input.display());
    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn print_record(rec: &ScanRecord) {
    println!("[{}] {}", rec.match_type, or_dash(&rec.product_name));
    if let Some(err) = &rec.error_message {
        println!("  error: {err}");
        return;
    }
    println!("  gtin14 {}  gtin13 {}", rec.gtin14, rec.gtin13);
    println!(
        "  expiry {} ({})  batch {}  serial {}  qty {}",
        or_dash(&rec.expiry_display),
        rec.expiry_status,
        or_dash(&rec.batch),
        or_dash(&rec.serial),
        rec.quantity
    );
}
