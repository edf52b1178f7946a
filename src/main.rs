//! sprl - command-line front end for the sprite layer compositor

use std::process::ExitCode;

use spritelayer::cli;

fn main() -> ExitCode {
    cli::run()
}
