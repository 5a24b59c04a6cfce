//! Rendering of the model's answer.

use crate::error::Result;
use std::io::Write;

/// Write the answer followed by a single newline. Nothing else goes to `out`.
pub fn render_answer<W: Write>(out: &mut W, answer: &str) -> Result<()> {
    writeln!(out, "{}", answer)?;
    out.flush()?;
    Ok(())
}
