//! CLI exit code registry. Scripts that batch monthly mailings rely on
//! these values; do not renumber.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad arguments, unreadable argument file)    |
//! | 3    | Reconciliation finished; some clients have no documents  |
//! | 4    | Invalid reconciliation config                            |
//! | 5    | Input error (client file, archive, malformed records)    |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. cannot write output).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing file named on the command line.
pub const EXIT_USAGE: u8 = 2;

/// Reconciliation completed but at least one client has no documents.
/// The report is still printed/written in full.
pub const EXIT_CLIENTS_WITHOUT_DOCUMENTS: u8 = 3;

/// Config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Client spreadsheet, archive or directory could not be turned into input.
pub const EXIT_INPUT: u8 = 5;
