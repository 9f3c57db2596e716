use crate::events::Command;
use anyhow::Context;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends one command line to a running daemon. Returns the reply for `status`.
pub fn send_command(socket_path: &Path, line: &str) -> anyhow::Result<Option<String>> {
    let command: Command = line.parse()?;

    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "Failed to connect to orrery daemon at {}. Is it running?",
            socket_path.display()
        )
    })?;

    writeln!(stream, "{}", line.trim())?;

    if command != Command::Status {
        return Ok(None);
    }

    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    let mut reply = String::new();
    BufReader::new(stream)
        .read_line(&mut reply)
        .context("No status reply from daemon")?;
    Ok(Some(reply.trim_end().to_string()))
}
