//! Sandboxed cart transform runner: one cart snapshot on stdin, one
//! decision on stdout. No logging subscriber, no other I/O.

use anyhow::{Context, Result};
use std::io::{self, BufReader, BufWriter, Write};

fn main() -> Result<()> {
    let stdin = BufReader::new(io::stdin().lock());
    let mut stdout = BufWriter::new(io::stdout().lock());
    bundlecraft::cart_transform::run(stdin, &mut stdout).context("cart transform input could not be read")?;
    stdout.flush()?;
    Ok(())
}
