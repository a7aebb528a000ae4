// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("soroban-flash");
    let cmd = format!("{} --play --no-countdown --level easy --seed 1", bin.display());

    // Spawn the TUI inside a pseudo terminal
    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(300));

    // Type an answer while the number is still showing; it must not be scored yet
    p.send("5")?;
    std::thread::sleep(Duration::from_millis(100));

    // Give up (back to start), then quit from the start screen
    p.send("\x1b")?; // ESC
    std::thread::sleep(Duration::from_millis(100));
    p.send("q")?;

    // Wait for the program to terminate cleanly
    p.expect(Eof)?;
    Ok(())
}
