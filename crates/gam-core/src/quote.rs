//! POSIX shell single-quoting
//!
//! The author script is a shell-sourceable fragment, so values are wrapped
//! in single quotes with embedded quotes encoded as `'\''`. The dequoter is
//! deliberately strict: it accepts exactly what the quoter can emit (plus
//! the historical `\!` escape) and rejects everything else, because a
//! loosely parsed author identity is worse than none.

/// Wraps `s` in single quotes, encoding embedded `'` as `'\''`.
#[must_use]
pub fn sq_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Strictly undoes [`sq_quote`]. Returns `None` unless the whole of `s` is
/// a single well-formed quoted word.
#[must_use]
pub fn sq_dequote(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'\'') {
        return None;
    }

    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 1;
    loop {
        match bytes.get(i) {
            None => return None, // unterminated quote
            Some(b'\'') => {
                i += 1;
                match bytes.get(i) {
                    None => return String::from_utf8(out).ok(),
                    Some(b'\\') => {
                        // only \' and \! may appear between quoted spans
                        let escaped = *bytes.get(i + 1)?;
                        if escaped != b'\'' && escaped != b'!' {
                            return None;
                        }
                        out.push(escaped);
                        if bytes.get(i + 2) != Some(&b'\'') {
                            return None;
                        }
                        i += 3;
                    }
                    Some(_) => return None, // trailing garbage after closing quote
                }
            }
            Some(&b) => {
                out.push(b);
                i += 1;
            }
        }
    }
}
