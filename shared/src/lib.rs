pub const GRID_SIZE: usize = 9;
pub const BOX_SIZE: usize = 3;
pub const MIN_VALUE: u8 = 1;
pub const MAX_VALUE: u8 = 9;

/// Session identifier assigned by the server: positive, monotonically
/// increasing, never reused for the lifetime of the process.
pub type SessionId = u64;

pub const UPDATE_SUCCESSFUL: &str = "Update successful!";
pub const UPDATE_FAILED: &str = "Update failed! Invalid move.";
pub const INVALID_INPUT: &str = "Invalid input. Use: update <row> <col> <value>";
pub const INVALID_COMMAND: &str = "Invalid command. Use 'show' or 'update <row> <col> <value>'";
pub const BOARD_HEADER: &str = "Current Sudoku board:";
pub const BOARD_UPDATED_HEADER: &str = "Board Updated:";
pub const GAME_COMPLETE_NO_WINNER: &str = "Game Complete! No winner this round.";

pub fn welcome_message(id: SessionId) -> String {
    format!("Welcome to the Sudoku server! You are Client {}.", id)
}

pub fn board_message(rendering: &str) -> String {
    format!("{}\n{}", BOARD_HEADER, rendering)
}

pub fn board_updated_message(rendering: &str) -> String {
    format!("{}\n{}", BOARD_UPDATED_HEADER, rendering)
}

pub fn game_complete_message(winner: Option<(SessionId, u32)>) -> String {
    match winner {
        Some((id, updates)) => format!(
            "Game Complete! The winner is Client {} with {} updates.",
            id, updates
        ),
        None => GAME_COMPLETE_NO_WINNER.to_string(),
    }
}

/// A parsed client command. Coordinates and value are kept as raw integers:
/// the protocol layer only guarantees they parsed, range validation is the
/// coordinator's job (out-of-range is a rejected move, not a protocol error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Update { row: i64, col: i64, value: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// `update` with three arguments that are not all decimal integers.
    InvalidArguments,
    /// Anything that is not `show` or a three-argument `update`.
    UnknownCommand,
}

impl ParseError {
    /// The canned response line sent to the offending client.
    pub fn response(&self) -> &'static str {
        match self {
            ParseError::InvalidArguments => INVALID_INPUT,
            ParseError::UnknownCommand => INVALID_COMMAND,
        }
    }
}

/// Parses one protocol line into a command.
///
/// The keyword is the first whitespace-separated token, compared
/// case-insensitively; `show` ignores any trailing tokens; `update` requires
/// exactly three argument tokens and falls through to
/// [`ParseError::UnknownCommand`] on wrong arity.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split_whitespace();
    let keyword = match tokens.next() {
        Some(keyword) => keyword,
        None => return Err(ParseError::UnknownCommand),
    };

    if keyword.eq_ignore_ascii_case("show") {
        return Ok(Command::Show);
    }

    if keyword.eq_ignore_ascii_case("update") {
        let args: Vec<&str> = tokens.collect();
        if args.len() != 3 {
            return Err(ParseError::UnknownCommand);
        }
        return match (
            args[0].parse::<i64>(),
            args[1].parse::<i64>(),
            args[2].parse::<i64>(),
        ) {
            (Ok(row), Ok(col), Ok(value)) => Ok(Command::Update { row, col, value }),
            _ => Err(ParseError::InvalidArguments),
        };
    }

    Err(ParseError::UnknownCommand)
}
