use pofile::{parse_po_content, BodyNode};
use std::io::prelude::*;

/// Writes `content` back out from its parsed nodes.
///
/// Runs of blank lines are collapsed into one and trailing blank lines are
/// dropped; everything else is written as it was parsed.
pub fn generate<W: Write>(output: &mut W, content: &str, file_path: &str) -> anyhow::Result<()> {
    let mut po = parse_po_content(content, file_path);

    let mut has_header = false;
    for node in po.header() {
        writeln!(output, "{}", node?)?;
        has_header = true;
    }
    if !has_header && po.line_index() > 0 {
        tracing::warn!(file = file_path, "no header block, the first line was skipped");
    }

    let mut pending_blank = has_header;
    for node in po.body() {
        match node? {
            BodyNode::Whitespace => pending_blank = true,
            node => {
                if pending_blank {
                    writeln!(output)?;
                    pending_blank = false;
                }
                writeln!(output, "{}", node)?;
            }
        }
    }
    Ok(())
}
