//! X display name handling.

/// Alternative display name to try when no cookie is listed for a local
/// display.
///
/// Local displays are often registered under the machine's hostname
/// (`host/unix:0`) rather than `localhost:0`. Returns `None` when `display`
/// is not a `localhost:` or `localhost/unix:` display.
pub fn local_display_fallback(display: &str, hostname: &str) -> Option<String> {
    if !display.starts_with("localhost:") && !display.starts_with("localhost/unix:") {
        return None;
    }
    let (_, screen) = display.split_once(':')?;
    Some(format!("{hostname}/unix:{screen}"))
}
