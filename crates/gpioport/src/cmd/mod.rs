use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;

pub mod doctor;
pub mod serve;
pub mod version;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sysfs_root: PathBuf,
    pub max_frame_size: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the port on stdin/stdout (the default).
    Serve,
    /// Check that the sysfs GPIO interface is usable.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Option<Command>, settings: &Settings) -> CliResult<i32> {
    match command.unwrap_or(Command::Serve) {
        Command::Serve => serve::run(settings),
        Command::Doctor(args) => doctor::run(args, settings),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Report format.
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
