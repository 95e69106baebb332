//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args, missing file)            |
//! | 10   | Not authenticated / rejected by the console API     |
//! | 11   | Upload blocked by validation errors                 |
//! | 12   | Upstream/API error (network, 5xx, bad response)     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// The console API rejected the token (401/403), or a token is
/// required and none is saved.
pub const EXIT_NOT_AUTH: u8 = 10;

/// Step-3 validation returned blocking errors; the upload was refused.
pub const EXIT_VALIDATION_BLOCKED: u8 = 11;

/// Network failure, 5xx, or an unparseable response from the console.
pub const EXIT_UPSTREAM: u8 = 12;
