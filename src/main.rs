//! Binary entrypoint that opens the contact journal database.

use std::process::ExitCode;

use contact_journal::start_journal;

/// Open and migrate the journal configured through the environment.
fn main() -> ExitCode {
    start_journal::run()
}
