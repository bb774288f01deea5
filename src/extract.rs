use tracing::warn;

/// Fence marker delimiting a code block in model output.
pub const FENCE: &str = "```";

/// Extract the first fenced code block from a model response.
///
/// The line holding the opening fence (usually a language tag) is skipped and
/// everything up to the next fence is returned, trimmed. Text without any fence,
/// or whose fence has no line after it, is returned unchanged. A block that
/// never closes runs to the end of the text.
pub fn extract_code_block(output: &str) -> String {
    let Some(fence) = output.find(FENCE) else {
        return output.to_string();
    };

    let after_fence = fence + FENCE.len();
    let Some(newline) = output[after_fence..].find('\n') else {
        // Only a tag follows the opening fence; there is no code to take.
        warn!("Code block body not found");
        return output.to_string();
    };

    let start = after_fence + newline + 1;
    let body = &output[start..];
    match body.find(FENCE) {
        Some(end) => body[..end].trim().to_string(),
        None => {
            warn!("Code block end not found");
            body.trim().to_string()
        }
    }
}
