/// Discord rejects messages above 2000 characters; stay under with a
/// margin for formatting added downstream.
const CHUNK_MAX: usize = 1950;

/// Split `text` into chunks of at most [`CHUNK_MAX`] bytes, preferring
/// newline then space boundaries, and never cutting a UTF-8 character.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.len() > CHUNK_MAX {
        let mut cut = CHUNK_MAX;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let window = &rest[..cut];
        let split_at = match window.rfind('\n').or_else(|| window.rfind(' ')) {
            Some(i) if i > 0 => i,
            _ => cut,
        };
        chunks.push(rest[..split_at].to_string());
        rest = rest[split_at..].trim_start();
    }
    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Send `text` to `channel_id`, chunked.
pub async fn send_chunked(
    http: &serenity::http::Http,
    channel_id: serenity::model::id::ChannelId,
    text: &str,
) -> Result<(), serenity::Error> {
    for chunk in split_chunks(text) {
        channel_id.say(http, chunk).await?;
    }
    Ok(())
}
