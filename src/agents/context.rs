//! Code context pulled from the files attached to the latest message

use crate::domain::ChatMessage;

/// Returned when the message carries no file contents
pub const NO_CODE_CONTEXT: &str = "NO CODE CONTEXT PROVIDED.";

/// Placed between consecutive file blocks
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

const UNKNOWN_FILE: &str = "UNKNOWN FILE";

fn file_blocks(message: &ChatMessage) -> Vec<String> {
    message
        .references()
        .iter()
        .filter(|reference| reference.is_file())
        .filter_map(|reference| {
            let content = reference.content()?;
            let name = reference.id.as_deref().unwrap_or(UNKNOWN_FILE);
            Some(format!(
                "\n\nFILENAME:\n{}\n\nCODE CONTENT:\n{}",
                name, content
            ))
        })
        .collect()
}

/// Labeled blocks for every attached file, in attachment order, or `None`
/// when nothing qualifies.
pub fn attached_code(message: &ChatMessage) -> Option<String> {
    let blocks = file_blocks(message);
    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join(BLOCK_SEPARATOR))
    }
}

/// Code context for the agent prompt; falls back to [`NO_CODE_CONTEXT`].
pub fn extract_code_context(message: &ChatMessage) -> String {
    attached_code(message).unwrap_or_else(|| NO_CODE_CONTEXT.to_string())
}
