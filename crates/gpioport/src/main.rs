mod cmd;
mod exit;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use gpioport::frame::DEFAULT_MAX_FRAME;
use gpioport::gpio::DEFAULT_SYSFS_ROOT;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "gpioport",
    version,
    about = "Expose one sysfs GPIO pin to a host process over stdin/stdout"
)]
struct Cli {
    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "GPIOPORT_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "GPIOPORT_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// sysfs GPIO class directory.
    #[arg(
        long,
        value_name = "DIR",
        default_value = DEFAULT_SYSFS_ROOT,
        env = "GPIOPORT_SYSFS_ROOT",
        global = true
    )]
    sysfs_root: PathBuf,

    /// Largest accepted frame in bytes, length prefix included.
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_FRAME as u32,
        value_parser = clap::value_parser!(u32).range(3..=65537),
        global = true
    )]
    max_frame: u32,

    /// Defaults to running the port on stdin/stdout.
    #[command(subcommand)]
    command: Option<Command>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let settings = cmd::Settings {
        sysfs_root: cli.sysfs_root,
        max_frame_size: cli.max_frame as usize,
    };
    let result = cmd::run(cli.command, &settings);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!(code = err.code, "{err}");
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
