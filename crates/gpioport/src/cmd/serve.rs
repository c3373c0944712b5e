use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd};

use gpioport::frame::FrameConfig;
use gpioport::gpio::{Pin, Sysfs};
use gpioport::Bridge;
use tracing::info;

use crate::cmd::Settings;
use crate::exit::{fatal_error, io_error, CliResult, SUCCESS};
use crate::logging::port_span;

pub fn run(settings: &Settings) -> CliResult<i32> {
    let _span = port_span().entered();

    // Raw duplicates: std's buffered stdin would hide bytes from poll.
    let input = dup_stdio(std::io::stdin().as_fd(), "stdin")?;
    let output = dup_stdio(std::io::stdout().as_fd(), "stdout")?;

    let pin = Pin::new(Sysfs::new(&settings.sysfs_root));
    let config = FrameConfig {
        max_frame_size: settings.max_frame_size,
    };

    info!(
        sysfs_root = %settings.sysfs_root.display(),
        max_frame = settings.max_frame_size,
        "port started"
    );

    let mut bridge = Bridge::new(input, output, pin, config);
    bridge.run().map_err(|err| fatal_error("port", err))?;

    Ok(SUCCESS)
}

fn dup_stdio(fd: BorrowedFd<'_>, name: &str) -> CliResult<File> {
    let owned = fd
        .try_clone_to_owned()
        .map_err(|err| io_error(&format!("{name} unavailable"), err))?;
    Ok(File::from(owned))
}
