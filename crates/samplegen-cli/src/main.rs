//! Samplegen CLI.
//!
//! Generates runnable code samples for a client library from a serialized
//! `CodeGeneratorRequest`, a YAML sample configuration and a directory of
//! Handlebars templates.
//!
//! # Examples
//!
//! ```bash
//! samplegen --sampleconfig samples.yaml \
//!     --serialized-proto request.bin \
//!     --template-dir templates \
//!     --output-dir out
//! ```

use anyhow::Result;
use clap::Parser;
use samplegen_cli::Cli;
use samplegen_cli::runner::{execute, init_logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let exit_code = execute(&cli, &mut std::io::stdout().lock())?;

    std::process::exit(exit_code.as_i32());
}
