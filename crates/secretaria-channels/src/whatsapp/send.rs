//! Outbound formatting, chunking, and retry policy.

use secretaria_core::error::SecretariaError;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use wacore_binary::jid::Jid;
use whatsapp_rust::client::Client;

/// Backoff schedule for failed sends, in milliseconds.
pub(super) const RETRY_DELAYS_MS: [u64; 3] = [500, 1000, 2000];

/// Send a message, retrying on transient failures. Returns the sent
/// message ID so callers can track it for echo suppression.
pub(super) async fn retry_send(
    client: &Arc<Client>,
    jid: &Jid,
    msg: waproto::whatsapp::Message,
) -> Result<String, SecretariaError> {
    let mut last_err = String::new();
    for attempt in 0..=RETRY_DELAYS_MS.len() {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt - 1])).await;
        }
        match client.send_message(jid.clone(), msg.clone()).await {
            Ok(msg_id) => return Ok(msg_id),
            Err(e) => {
                warn!("whatsapp send attempt {} failed: {e}", attempt + 1);
                last_err = e.to_string();
            }
        }
    }
    Err(SecretariaError::Channel(format!(
        "whatsapp send failed after retries: {last_err}"
    )))
}

/// Split a message into chunks no longer than `max_len` bytes, preferring
/// newline boundaries. WhatsApp rejects oversized message payloads.
pub(super) fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if !current.is_empty() && current.len() + line.len() > max_len {
            chunks.push(std::mem::take(&mut current));
        }
        if line.len() > max_len {
            // A single line longer than the limit: hard split on char boundaries.
            for ch in line.chars() {
                if current.len() + ch.len_utf8() > max_len {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
        } else {
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
        .into_iter()
        .map(|c| c.trim_end_matches('\n').to_string())
        .collect()
}

/// Rewrite common markdown into WhatsApp's native formatting.
///
/// Model replies tend to come back as markdown; WhatsApp renders `*bold*`
/// and `_italic_` but not headers, links, or tables.
pub(super) fn sanitize_for_whatsapp(text: &str) -> String {
    let mut out_lines = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();

        // Horizontal rules add nothing in a chat bubble.
        if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-') {
            continue;
        }

        if trimmed.starts_with('|') {
            // Table separator rows disappear; data rows become bullets.
            if trimmed.chars().all(|c| matches!(c, '|' | '-' | ':' | ' ')) {
                continue;
            }
            let cells = trimmed.trim_matches('|').trim();
            out_lines.push(format!("- {cells}"));
            continue;
        }

        if let Some(title) = heading_text(trimmed) {
            out_lines.push(format!("*{}*", title.to_uppercase()));
            continue;
        }

        out_lines.push(rewrite_inline(line));
    }
    out_lines.join("\n")
}

/// Text of a markdown heading, or `None` if the line isn't one.
fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes) {
        line[hashes..].strip_prefix(' ').map(str::trim)
    } else {
        None
    }
}

/// Rewrite `**bold**` to `*bold*` and `[label](url)` to `label (url)`.
fn rewrite_inline(line: &str) -> String {
    let line = line.replace("**", "*");

    let mut out = String::with_capacity(line.len());
    let mut rest = line.as_str();
    while let Some(open) = rest.find('[') {
        let candidate = &rest[open..];
        if let Some(close) = candidate.find("](") {
            if let Some(end) = candidate[close + 2..].find(')') {
                let label = &candidate[1..close];
                let url = &candidate[close + 2..close + 2 + end];
                out.push_str(&rest[..open]);
                out.push_str(label);
                out.push_str(" (");
                out.push_str(url);
                out.push(')');
                rest = &candidate[close + 2 + end + 1..];
                continue;
            }
        }
        out.push_str(&rest[..open + 1]);
        rest = &rest[open + 1..];
    }
    out.push_str(rest);
    out
}
