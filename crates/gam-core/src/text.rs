//! Small text helpers shared across the intake pipeline

/// Returns the first line of `msg`, without the newline.
#[must_use]
pub fn first_line(msg: &str) -> &str {
    msg.split('\n').next().unwrap_or("")
}

/// Parses a base-10 integer from the leading digits of `s`, ignoring
/// everything from the first non-digit on. Mirrors `strtol(s, NULL, 10)`
/// for the non-negative inputs our state files contain: an empty or
/// non-numeric prefix yields 0.
#[must_use]
pub fn decimal_prefix(s: &str) -> usize {
    let digits: &str = {
        let end = s
            .as_bytes()
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(s.len());
        &s[..end]
    };
    digits.parse().unwrap_or(0)
}

/// Normalizes whitespace in a commit message:
/// - trailing whitespace is stripped from every line,
/// - runs of blank lines collapse to a single blank line,
/// - leading and trailing blank lines are removed,
/// - a non-empty result ends with exactly one newline.
#[must_use]
pub fn stripspace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_blank = false;

    for line in s.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}
