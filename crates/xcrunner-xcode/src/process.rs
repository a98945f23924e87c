//! Foreground process spawning
//!
//! Used by the log tail flow: the child inherits stdio and this
//! invocation blocks until it exits or is killed externally. No
//! timeout is applied; a hung child blocks the whole invocation, which
//! is acceptable for a foreground interactive CLI step.

use tokio::process::Command;
use xcrunner_core::prelude::*;

/// Spawn a child with inherited stdio and wait for it to exit
///
/// A launch failure or non-zero exit is fatal to the caller; output
/// streams straight to the user's terminal.
pub async fn spawn_foreground(program: &str, args: &[&str]) -> Result<()> {
    info!("Spawning foreground process: {} {}", program, args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .spawn()
        .map_err(|e| Error::spawn(format!("{} {}: {}", program, args.join(" "), e)))?;

    let status = child
        .wait()
        .await
        .map_err(|e| Error::spawn(format!("waiting on {}: {}", program, e)))?;

    if !status.success() {
        return Err(Error::ProcessExit {
            code: status.code(),
        });
    }

    Ok(())
}
