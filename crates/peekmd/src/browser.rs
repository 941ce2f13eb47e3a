//! Opening the preview in the default browser.

use std::io;
use std::process::{Command, Stdio};

/// Platform command that opens `url` in the default browser.
fn open_command(url: &str) -> Command {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command.arg(url);
    command
}

/// Open `url` in the default browser.
///
/// # Errors
///
/// Returns an error if the opener cannot be spawned or exits unsuccessfully.
pub(crate) fn open_browser(url: &str) -> io::Result<()> {
    let status = open_command(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("browser opener exited with {status}")))
    }
}
