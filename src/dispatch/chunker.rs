//! Split text into transport-sized segments without touching its characters.
//!
//! Lengths are counted in `char`s. Concatenating the output always yields the
//! input exactly.

/// Preferred cut points, best first. A cut keeps the boundary character at
/// the end of the earlier segment.
const BOUNDARIES: [char; 2] = ['\n', ' '];

/// Byte length of the next segment taken from the front of `window`.
fn cut_point(window: &str) -> usize {
    BOUNDARIES
        .iter()
        .find_map(|&boundary| window.rfind(boundary).map(|pos| pos + boundary.len_utf8()))
        .unwrap_or(window.len())
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Each piece is cut after the last line break that fits, else after the
/// last space, else at exactly `max_chars`. Text that already fits is
/// returned whole; empty text or a zero limit yields no segments.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let Some((window_end, _)) = rest.char_indices().nth(max_chars) else {
            segments.push(rest.to_string());
            break;
        };
        let (segment, tail) = rest.split_at(cut_point(&rest[..window_end]));
        segments.push(segment.to_string());
        rest = tail;
    }
    segments
}
