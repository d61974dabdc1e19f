use anyhow::{Context, Result};
use arboard::Clipboard;

/// Hidden argument that turns the process into a clipboard owner.
///
/// X11/Wayland clipboards are served by the owning process, so on Linux the
/// text is handed to a detached copy of this binary that outlives the TUI.
pub const DAEMON_FLAG: &str = "__ctxyank_clipboard_daemon";

/// Runs the clipboard owner when started with [`DAEMON_FLAG`].
/// Returns `Ok(true)` if this process was the daemon.
pub fn run_daemon_if_requested() -> Result<bool> {
    if !std::env::args().any(|a| a == DAEMON_FLAG) {
        return Ok(false);
    }
    #[cfg(target_os = "linux")]
    {
        serve_stdin_until_replaced()?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        log::warn!("{} is only used on Linux; ignoring.", DAEMON_FLAG);
    }
    Ok(true)
}

#[cfg(target_os = "linux")]
fn serve_stdin_until_replaced() -> Result<()> {
    use arboard::SetExtLinux;

    let text = std::io::read_to_string(std::io::stdin()).context("reading clipboard text")?;
    let mut clipboard = Clipboard::new()?;
    // Blocks until another application takes the selection.
    clipboard.set().wait().text(text)?;
    Ok(())
}

pub fn copy_text(text: &str) -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        spawn_daemon_with(text)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard = Clipboard::new().context("opening clipboard")?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn spawn_daemon_with(text: &str) -> Result<()> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new(std::env::current_exe()?)
        .arg(DAEMON_FLAG)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .current_dir("/")
        .spawn()
        .context("starting clipboard daemon")?;

    let mut stdin = child
        .stdin
        .take()
        .context("clipboard daemon has no stdin")?;
    stdin.write_all(text.as_bytes())?;
    stdin.flush()?;
    log::debug!("Handed {} bytes to clipboard daemon {}", text.len(), child.id());
    Ok(())
}
