//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on these codes.
//!
//! | Code | Description                                                  |
//! |------|--------------------------------------------------------------|
//! | 0    | Success. A query with no matching address is still a success |
//! | 1    | Runtime error (no dataset available, output not writable)    |
//! | 2    | Usage or configuration error (bad args, invalid settings)    |

/// Success - command completed, including "no exact matches found".
pub const EXIT_SUCCESS: u8 = 0;

/// Runtime error - the command could not produce its output.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or an invalid settings file.
/// Matches the code clap uses for argument errors.
pub const EXIT_USAGE: u8 = 2;
