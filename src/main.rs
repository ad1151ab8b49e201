use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use oftr_probe::{version, OftrLibrary, ProbeError};

const DEFAULT_LIBRARY: &str = "/usr/local/bin/oftr";

/// Loads an oftr library and checks the version reported by `oftr_call`
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the oftr executable or shared library
    #[arg(value_name = "LIBRARY", default_value = DEFAULT_LIBRARY)]
    lib: PathBuf,

    /// More logging on stderr; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => {
            log::debug!("Exiting with code={code}");
            std::process::exit(code);
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2)
        }
    }
}

fn run() -> oftr_probe::Result<i32> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_timed_builder()
        .format_timestamp_millis()
        .filter_level(level)
        .init();

    log::info!("Opening library: '{}'", cli.lib.display());
    let lib = OftrLibrary::load(&cli.lib)?;
    log::debug!("Loaded '{}'", lib.path().display());
    let text = lib.version()?;
    match version::check(&text) {
        Ok(info) => {
            log::info!("Version {info} from {}", info.url);
            println!("{text}");
            Ok(0)
        }
        Err(ProbeError::VersionMismatch { actual, pattern }) => {
            println!("'{actual}' does not match");
            println!("'{pattern}'");
            Ok(1)
        }
        Err(e) => Err(e),
    }
}
