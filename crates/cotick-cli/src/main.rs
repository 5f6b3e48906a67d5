//! cotick - tick-driven command and routine host
//!
//! Reads commands from stdin, one per line, ticking the scheduler once
//! per line. When input ends, keeps ticking until no process is alive
//! or the tick budget runs out. `quit` / `q` stops at once.
//!
//! # Configuration
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`COTICK_*`)
//! 3. Project config (`.cotick/config.toml` in the project root)
//! 4. Global config (`~/.cotick/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `COTICK_DEBUG`: Enable debug mode (`true`/`false`)
//! - `COTICK_SMART`: Spread same-period processes over ticks
//! - `COTICK_MAX_TICKS`: Tick budget after input ends
//! - `COTICK_ROUTINES`: Routine document to load
//! - `COTICK_SAVE_FILE`: Persisted key/value state

mod tracing_writer;

use anyhow::{Context, Result};
use clap::Parser;
use cotick_command::CommandSerializer;
use cotick_runtime::config::{ConfigError, ConfigLoader, CotickConfig};
use cotick_runtime::Host;
use cotick_types::Logger;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// cotick - tick-driven command and routine host
#[derive(Parser, Debug)]
#[command(name = "cotick")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long)]
    project: Option<PathBuf>,

    /// Routine document to load (also: COTICK_ROUTINES)
    #[arg(short, long, value_name = "PATH")]
    routines: Option<PathBuf>,

    /// Key/value save file (also: COTICK_SAVE_FILE)
    #[arg(short, long, value_name = "PATH")]
    save_file: Option<PathBuf>,

    /// Tick budget once input is exhausted (also: COTICK_MAX_TICKS)
    #[arg(long, value_name = "N")]
    max_ticks: Option<u64>,

    /// Milliseconds to sleep between ticks once input is exhausted
    #[arg(long, value_name = "MS")]
    tick_interval: Option<u64>,

    /// Disable smart counter spreading
    #[arg(long)]
    no_smart: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// File log level (default: debug)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Command to execute before reading stdin
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

/// Loads file and env config, then applies CLI flags on top.
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    routines: Option<PathBuf>,
    save_file: Option<PathBuf>,
    max_ticks: Option<u64>,
    tick_interval: Option<u64>,
    no_smart: bool,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to get current directory, using '.'");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            debug: args.debug,
            routines: args.routines.clone(),
            save_file: args.save_file.clone(),
            max_ticks: args.max_ticks,
            tick_interval: args.tick_interval,
            no_smart: args.no_smart,
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        }
    }

    fn resolve(&self) -> Result<CotickConfig, ConfigError> {
        let mut config = ConfigLoader::new()
            .with_project_root(&self.project_root)
            .load()?;

        if self.debug {
            config.debug = true;
        }
        if let Some(ref p) = self.routines {
            config.paths.routines = Some(p.clone());
        }
        if let Some(ref p) = self.save_file {
            config.paths.save_file = Some(p.clone());
        }
        if let Some(n) = self.max_ticks {
            config.scheduler.max_ticks = n;
        }
        if let Some(ms) = self.tick_interval {
            config.scheduler.tick_interval_ms = ms;
        }
        if self.no_smart {
            config.scheduler.smart = false;
        }
        if let Some(ref p) = self.log_file {
            config.logging.file = Some(p.clone());
        }
        if let Some(ref level) = self.log_level {
            config.logging.file_level.clone_from(level);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    init_tracing(&args, &config);
    info!(path = %resolver.project_root.display(), "Project root");

    let logger = Logger::new(|line| {
        print_line(&mut io::stdout().lock(), line);
    });
    let mut host = Host::new(config, logger).context("Failed to start host")?;
    info!(
        routines = host.routines().len(),
        smart = host.scheduler().is_smart(),
        "Host initialized"
    );

    if let Some((name, rest)) = args.command.split_first() {
        let line = CommandSerializer::new(name.as_str()).args(rest).to_string();
        info!("Command mode: {line}");
        submit(&mut host, &line);
    }

    let quit = read_commands(&mut host, io::stdin().lock())?;
    if !quit {
        let ticks = host.run_until_idle();
        info!(ticks, idle = host.is_idle(), "Input exhausted");
    }

    host.shutdown().context("Failed to save state")?;
    Ok(())
}

/// Terminal filter: --debug > --verbose > RUST_LOG > "warn". The file
/// layer keeps its own filter from `logging.file_level`.
fn init_tracing(args: &Args, config: &CotickConfig) {
    let terminal_filter = if args.debug || config.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(terminal_filter);

    let log_file = config
        .logging
        .file
        .as_deref()
        .and_then(|path| match tracing_writer::LogFile::open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Warning: cannot open log file {}: {e}", path.display());
                None
            }
        });

    if let Some(file) = log_file {
        let path = file.path().to_path_buf();
        let file_layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(file)
            .with_filter(EnvFilter::new(&config.logging.file_level));

        tracing_subscriber::registry()
            .with(terminal_layer)
            .with(file_layer)
            .init();
        info!(path = %path.display(), level = %config.logging.file_level, "File logging enabled");
    } else {
        tracing_subscriber::registry().with(terminal_layer).init();
    }
}

/// Dispatches one line and advances the scheduler by one tick.
/// Writes one sink line, logging (not propagating) a failed write such
/// as a closed pipe.
fn print_line(out: &mut impl Write, line: &str) -> bool {
    match writeln!(out, "{line}") {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "failed to write output line");
            false
        }
    }
}

fn submit(host: &mut Host, line: &str) {
    if let Err(e) = host.execute(line) {
        debug!(error = %e, "command rejected");
    }
    host.tick();
}

/// Feeds `input` to the host line by line. Returns `true` on `quit`.
fn read_commands(host: &mut Host, input: impl BufRead) -> Result<bool> {
    for line in input.lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "q" => {
                info!("Quit requested");
                return Ok(true);
            }
            _ => submit(host, line),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn resolver_in(dir: &TempDir) -> CliConfigResolver {
        CliConfigResolver {
            project_root: dir.path().to_path_buf(),
            debug: false,
            routines: None,
            save_file: None,
            max_ticks: None,
            tick_interval: None,
            no_smart: false,
            log_file: None,
            log_level: None,
        }
    }

    #[test]
    fn cli_flags_override_project_config() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(".cotick");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[scheduler]\nmax_ticks = 7\ntick_interval_ms = 5\n",
        )
        .unwrap();

        let mut resolver = resolver_in(&dir);
        let config = resolver.resolve().unwrap();
        assert_eq!(config.scheduler.max_ticks, 7);
        assert_eq!(config.scheduler.tick_interval_ms, 5);

        resolver.max_ticks = Some(3);
        resolver.no_smart = true;
        resolver.routines = Some(PathBuf::from("r.txt"));
        let config = resolver.resolve().unwrap();
        assert_eq!(config.scheduler.max_ticks, 3);
        assert_eq!(config.scheduler.tick_interval_ms, 5);
        assert!(!config.scheduler.smart);
        assert_eq!(config.paths.routines, Some(PathBuf::from("r.txt")));
    }

    #[test]
    fn false_flags_preserve_loader_values() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(".cotick");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "debug = true\n").unwrap();

        let config = resolver_in(&dir).resolve().unwrap();
        assert!(config.debug);
    }

    #[test]
    fn from_args_keeps_trailing_command() {
        let args = Args::parse_from(["cotick", "-C", "/tmp", "--max-ticks", "9", "echo", "-v"]);
        assert_eq!(args.command, ["echo", "-v"]);
        assert!(!args.verbose);

        let resolver = CliConfigResolver::from_args(&args);
        assert_eq!(resolver.project_root, PathBuf::from("/tmp"));
        assert_eq!(resolver.max_ticks, Some(9));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn print_line_reports_write_failures() {
        let mut out = Vec::new();
        assert!(print_line(&mut out, "hello"));
        assert_eq!(out, b"hello\n");

        assert!(!print_line(&mut ClosedPipe, "lost"));
    }

    #[test]
    fn quit_stops_reading() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let captured = Rc::clone(&lines);
        let logger = Logger::new(move |line| captured.borrow_mut().push(line.to_string()));
        let mut host = Host::new(CotickConfig::default(), logger).unwrap();
        lines.borrow_mut().clear();

        let input = io::Cursor::new("echo one\n\n  echo two  \nq\necho three\n");
        assert!(read_commands(&mut host, input).unwrap());
        assert_eq!(*lines.borrow(), ["one", "two"]);

        let input = io::Cursor::new("echo four\n");
        assert!(!read_commands(&mut host, input).unwrap());
    }
}
