use google_gmail1::api::{MessagePart, MessagePartHeader};
use tracing::debug;

/// Decoded body of the first `text/plain` part, depth-first.
pub fn plain_text_body(part: &MessagePart) -> Option<String> {
    match part.mime_type.as_deref() {
        Some("text/plain") => {
            let data = part.body.as_ref()?.data.as_ref()?;
            Some(String::from_utf8_lossy(data).into_owned())
        }
        Some(mime) if mime.starts_with("multipart/") => part
            .parts
            .as_ref()?
            .iter()
            .find_map(plain_text_body),
        other => {
            debug!(mime = ?other, "Skipping non-text part");
            None
        }
    }
}

pub fn get_header<'a>(
    headers: Option<&'a Vec<MessagePartHeader>>,
    name: &str,
) -> Option<&'a str> {
    headers?
        .iter()
        .find(|h| h.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        .and_then(|h| h.value.as_deref())
}
