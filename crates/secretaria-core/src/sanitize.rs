//! Reply sanitization for reasoning models.
//!
//! DeepSeek-R1 style models wrap their chain of thought in `<think>…</think>`
//! blocks. Those blocks must never reach the user or the message store.

/// Result of sanitizing a model reply.
#[derive(Debug)]
pub struct SanitizeResult {
    /// The cleaned text, trimmed.
    pub text: String,
    /// Whether any reasoning block was removed.
    pub was_modified: bool,
}

/// Strip every `<think>…</think>` block from a model reply.
///
/// An unterminated `<think>` swallows the rest of the reply — better an empty
/// answer than leaked reasoning.
pub fn strip_reasoning(reply: &str) -> SanitizeResult {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut text = String::with_capacity(reply.len());
    let mut rest = reply;
    let mut was_modified = false;

    while let Some(start) = rest.find(OPEN) {
        was_modified = true;
        text.push_str(&rest[..start]);
        match rest[start + OPEN.len()..].find(CLOSE) {
            Some(end) => {
                rest = &rest[start + OPEN.len() + end + CLOSE.len()..];
            }
            None => {
                rest = "";
                break;
            }
        }
    }
    text.push_str(rest);

    SanitizeResult {
        text: text.trim().to_string(),
        was_modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reply_passes_through() {
        let result = strip_reasoning("Claro, mañana a las 10.");
        assert!(!result.was_modified);
        assert_eq!(result.text, "Claro, mañana a las 10.");
    }

    #[test]
    fn test_leading_think_block_removed() {
        let result = strip_reasoning(
            "<think>The user wants a reminder. I should emit the directive.</think>\n¡Hecho!",
        );
        assert!(result.was_modified);
        assert_eq!(result.text, "¡Hecho!");
    }

    #[test]
    fn test_multiple_blocks_removed() {
        let result = strip_reasoning("<think>a</think>uno <think>b</think>dos");
        assert!(result.was_modified);
        assert_eq!(result.text, "uno dos");
    }

    #[test]
    fn test_unterminated_block_swallows_rest() {
        let result = strip_reasoning("hola <think>hmm, what should I");
        assert!(result.was_modified);
        assert_eq!(result.text, "hola");
    }
}
