const MARKER: [char; 2] = ['0', 'x'];
const SUFFIX_LEN: usize = 8;

/// Strips parser-generated address suffixes (`0x` followed by exactly eight
/// characters) from an identifier.
///
/// Matches are removed left to right without overlap, and the pass is
/// repeated until nothing changes, so the result is a fixed point:
/// `normalize(&normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut current = strip_once(raw);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let match_len = MARKER.len() + SUFFIX_LEN;
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars.len() - i >= match_len && chars[i..i + MARKER.len()] == MARKER {
            i += match_len;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}
