//! Make a rendered segment safe as a path component and shell token.

/// Characters never allowed in a sanitized segment.
pub const RESERVED: [char; 10] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|', '$'];

fn replacement(c: char) -> Option<&'static str> {
    match c {
        '\\' | '/' | ':' | '|' => Some("-"),
        '*' => Some("\u{b7}"),
        '?' => Some("qt"),
        '"' => Some("'"),
        '<' => Some("lt"),
        '>' => Some("gt"),
        '$' => Some("S"),
        _ => None,
    }
}

/// Replace every reserved character in one pass.
pub fn sanitize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match replacement(c) {
            Some(r) => out.push_str(r),
            None => out.push(c),
        }
    }
    out
}
