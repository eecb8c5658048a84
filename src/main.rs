use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use log::{debug, error};
use log::LevelFilter;
use lossless_ini::{IniFile, IniFileStore, IoError, WriteError};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEBUG_ENV: &str = "LOSSLESS_INI_DEBUG";

#[derive(Debug, Default, PartialEq)]
struct Config {
    command: Option<Command>,
    verbose: bool,
    version: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Get { file: PathBuf, path: String },
    Set { file: PathBuf, path: String, value: String },
    Unset { file: PathBuf, path: String },
    List { file: PathBuf },
    Check { file: PathBuf },
}

#[derive(Debug, thiserror::Error)]
enum RuntimeError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Load(#[from] IoError),
    #[error("{0}")]
    Write(#[from] WriteError),
}

fn help() {
    println!(
        "Usage:
lossless-ini --version
lossless-ini [-v|--verbose] get FILE PATH
lossless-ini [-v|--verbose] set FILE PATH VALUE
lossless-ini [-v|--verbose] unset FILE PATH
lossless-ini [-v|--verbose] list FILE
lossless-ini [-v|--verbose] check FILE"
    );
}

fn debug_requested(verbose: bool) -> bool {
    verbose || env::var_os(DEBUG_ENV).is_some()
}

// stdout carries command output, so log lines go to stderr without decoration
fn log_config() -> simplelog::Config {
    simplelog::ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .build()
}

fn parse_args(args: Vec<String>) -> Result<Config, String> {
    let mut cfg = Config::default();

    let mut rest = args.into_iter().skip(1).peekable();
    while let Some(arg) = rest.next_if(|a| a.starts_with('-')) {
        match &arg[..] {
            "--verbose" | "-v" => cfg.verbose = true,
            "--version" => cfg.version = true,
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    let positional: Vec<String> = rest.collect();
    if cfg.version {
        return Ok(cfg);
    }

    let Some((name, operands)) = positional.split_first() else {
        return Err("Too few arguments".into());
    };

    let arity = match &name[..] {
        "get" | "unset" => 2,
        "set" => 3,
        "list" | "check" => 1,
        _ => return Err(format!("Unknown command: {name}")),
    };
    if operands.len() < arity {
        return Err("Too few arguments".into());
    }
    if operands.len() > arity {
        return Err(format!("Unexpected argument: {}", operands[arity]));
    }

    let file = PathBuf::from(&operands[0]);
    cfg.command = Some(match &name[..] {
        "get" => Command::Get {
            file,
            path: operands[1].clone(),
        },
        "set" => Command::Set {
            file,
            path: operands[1].clone(),
            value: operands[2].clone(),
        },
        "unset" => Command::Unset {
            file,
            path: operands[1].clone(),
        },
        "list" => Command::List { file },
        _ => Command::Check { file },
    });

    Ok(cfg)
}

/// Runs `command`, printing results to `out`. `Ok(false)` means "not found" or
/// "does not round-trip".
fn run<W: Write>(command: &Command, out: &mut W) -> Result<bool, RuntimeError> {
    match command {
        Command::Get { file, path } => {
            let store = IniFileStore::read_file(file)?;
            match store.get_value(path) {
                Some(value) => {
                    writeln!(out, "{value}")?;
                    Ok(true)
                }
                None => {
                    debug!("{path} not found in {file:?}");
                    Ok(false)
                }
            }
        }
        Command::Set { file, path, value } => {
            let mut store = IniFileStore::read_file(file)?;
            store.set_value(path, Some(value))?;
            store.write_file()?;
            Ok(true)
        }
        Command::Unset { file, path } => {
            let mut store = IniFileStore::read_file(file)?;
            if store.remove_value(path) {
                store.write_file()?;
            } else {
                debug!("{path} not found in {file:?}, leaving it untouched");
            }
            Ok(true)
        }
        Command::List { file } => {
            let store = IniFileStore::read_file(file)?;
            for (path, value) in store.read_data().iter() {
                writeln!(out, "{path}={value}")?;
            }
            Ok(true)
        }
        Command::Check { file } => {
            let original = std::fs::read_to_string(file)?;
            let reserialized = IniFile::load_from_str(&original)
                .map_err(IoError::from)?
                .to_string();
            if reserialized == original {
                writeln!(out, "{}: ok", file.display())?;
                Ok(true)
            } else {
                writeln!(out, "{}: does not round-trip", file.display())?;
                Ok(false)
            }
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let cfg = match parse_args(args) {
        Ok(cfg) => cfg,
        Err(msg) => {
            println!("Error: {}", msg);
            help();
            std::process::exit(1)
        }
    };

    let _ = simplelog::WriteLogger::init(
        if debug_requested(cfg.verbose) { LevelFilter::Debug } else { LevelFilter::Info },
        log_config(),
        io::stderr(),
    );

    if cfg.version {
        println!("lossless-ini {}", VERSION);
        std::process::exit(0);
    }

    let Some(command) = cfg.command else {
        help();
        std::process::exit(1)
    };

    debug!("Running {command:?}");

    let stdout = io::stdout();
    match run(&command, &mut stdout.lock()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{e}");
            std::process::exit(1)
        }
    }
}
