//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes of `rollcall`.
//! Scripts rely on them, so treat them as part of the shell contract.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success: report written                              |
//! | 1    | General error (report could not be written, etc.)    |
//! | 2    | Usage / configuration error                          |
//! | 3    | A required input file is missing                     |
//! | 5    | An input file could not be parsed                    |

/// Success - comparison ran and the report was written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid config.
pub const EXIT_USAGE: u8 = 2;

/// An input export (API, workbook, attendance) does not exist.
pub const EXIT_MISSING_INPUT: u8 = 3;

/// Malformed JSON, unreadable workbook, or missing ID column.
pub const EXIT_PARSE: u8 = 5;
