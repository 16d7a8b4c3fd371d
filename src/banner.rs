use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time;

/// Single passive read from a freshly opened stream, bounded by `deadline`.
///
/// Reads at most `buf_size` bytes in one call. Timeouts, resets and EOF all
/// give `None`; nothing is ever written to the peer.
pub async fn probe<S>(stream: &mut S, deadline: Duration, buf_size: usize) -> Option<Vec<u8>>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    match time::timeout(deadline, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            Some(buf)
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            tracing::trace!(error = %e, "banner read failed");
            None
        }
        Err(_) => None,
    }
}

/// Make a banner printable on one line: newlines escaped, at most `max` chars.
pub fn snippet(banner: &str, max: usize) -> String {
    let escaped = banner.replace('\n', "\\n").replace('\r', "\\r");
    escaped.chars().take(max).collect()
}
