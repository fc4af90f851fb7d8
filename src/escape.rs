//! Reversible escaping, in two independent layers.
//!
//! Layer 1 — [`protect`]/[`unprotect`]: a total character substitution over
//! the characters that carry query syntax (`&`, `=`, `,`), applied to values
//! before percent-encoding and undone after percent-decoding. `!` is the
//! escape lead because it is an RFC 3986 sub-delim that survives
//! percent-coding untouched, which keeps the two layers independent.
//!
//! Layer 2 — [`percent_encode`]/[`percent_decode`]: UTF-8 percent-coding of
//! everything outside the unreserved set, with `+` accepted as space on the
//! way in.

use alloc::string::String;
use alloc::vec::Vec;

/// Substitute syntax characters in `s` so the result contains no literal
/// `&`, `=` or `,`. Inverse of [`unprotect`].
///
/// `!` → `!!`, `&` → `!a`, `=` → `!e`, `,` → `!c`.
pub fn protect(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '!' => out.push_str("!!"),
            '&' => out.push_str("!a"),
            '=' => out.push_str("!e"),
            ',' => out.push_str("!c"),
            c => out.push(c),
        }
    }
    out
}

/// Undo [`protect`]. Total: a `!` followed by anything other than a known
/// code (or at end of input) passes through unchanged.
pub fn unprotect(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '!' {
            out.push(c);
            continue;
        }
        match chars.clone().next() {
            Some('!') => {
                out.push('!');
                chars.next();
            }
            Some('a') => {
                out.push('&');
                chars.next();
            }
            Some('e') => {
                out.push('=');
                chars.next();
            }
            Some('c') => {
                out.push(',');
                chars.next();
            }
            _ => out.push('!'),
        }
    }
    out
}

/// True for bytes emitted literally by [`percent_encode`].
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'!')
}

/// Percent-encode `s` as UTF-8, leaving the unreserved set literal.
pub fn percent_encode(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[usize::from(b >> 4)] as char);
            out.push(HEX[usize::from(b & 0x0f)] as char);
        }
    }
    out
}

/// Percent-decode `s`, treating `+` as space. Invalid `%` sequences pass
/// through literally; invalid UTF-8 decodes lossily.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    out.push((hi << 4) | lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    match String::from_utf8(out) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protect_removes_syntax_chars() {
        let p = protect("a&b=c,d!e");
        assert!(!p.contains('&'));
        assert!(!p.contains('='));
        assert!(!p.contains(','));
        assert_eq!(p, "a!ab!ec!cd!!e");
    }

    #[test]
    fn unprotect_inverts_protect() {
        for s in ["", "plain", "a&b=c,d", "!!", "!a!c", "x!y", "trailing!"] {
            assert_eq!(unprotect(&protect(s)), s, "for {s:?}");
        }
    }

    #[test]
    fn unprotect_is_total_on_stray_escapes() {
        assert_eq!(unprotect("!z"), "!z");
        assert_eq!(unprotect("!"), "!");
    }

    #[test]
    fn percent_encodes_reserved_and_utf8() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a&b"), "a%26b");
        assert_eq!(percent_encode("caf\u{e9}"), "caf%C3%A9");
        assert_eq!(percent_encode("a!b"), "a!b");
    }

    #[test]
    fn percent_decode_inverts_encode() {
        for s in ["", "plain", "a b&c=d", "caf\u{e9}", "100%"] {
            assert_eq!(percent_decode(&percent_encode(s)), s, "for {s:?}");
        }
    }

    #[test]
    fn percent_decode_accepts_plus_and_bad_sequences() {
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%2Fx"), "/x");
    }

    #[test]
    fn layers_compose_independently() {
        let raw = "alarm, zone=3 & 4";
        let wire = percent_encode(&protect(raw));
        assert!(!wire.contains('&') && !wire.contains('=') && !wire.contains(','));
        assert_eq!(unprotect(&percent_decode(&wire)), raw);
    }
}
