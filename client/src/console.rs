//! Local validation of typed commands before they go on the wire.

use shared::{parse_command, Command};

/// True if `line` is a command worth sending to the server.
///
/// Stricter than the server's own parser in one place: a `show` with
/// trailing tokens is accepted server-side but rejected here, so the user
/// gets immediate feedback instead of silently having the extra tokens
/// ignored.
pub fn validate(line: &str) -> bool {
    match parse_command(line) {
        Ok(Command::Show) => line.split_whitespace().count() == 1,
        Ok(Command::Update { .. }) => true,
        Err(_) => false,
    }
}
