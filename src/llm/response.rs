//! Post-processing for model output.

/// Trim surrounding whitespace from a model reply.
pub fn clean_response(text: &str) -> String {
    text.trim().to_string()
}

/// Reduce a model reply to a single commit subject of at most `max_len`
/// characters.
///
/// Keeps the first non-empty line, drops wrapping quotes or backticks, and
/// cuts at the last word boundary that fits. A single word longer than
/// `max_len` is cut mid-word.
pub fn cap_subject(text: &str, max_len: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("```"))
        .unwrap_or_default();

    let subject = strip_wrapping(line);

    if subject.chars().count() <= max_len {
        return subject.to_string();
    }

    let cut: String = subject.chars().take(max_len).collect();
    let next_is_space = subject
        .chars()
        .nth(max_len)
        .is_some_and(char::is_whitespace);

    if next_is_space {
        return cut.trim_end().to_string();
    }

    match cut.rfind(char::is_whitespace) {
        Some(idx) if !cut[..idx].trim_end().is_empty() => cut[..idx].trim_end().to_string(),
        _ => cut,
    }
}

fn strip_wrapping(line: &str) -> &str {
    let mut s = line.trim();
    loop {
        let stripped = ['"', '\'', '`'].iter().find_map(|&q| {
            s.strip_prefix(q)
                .and_then(|rest| rest.strip_suffix(q))
                .map(str::trim)
        });
        match stripped {
            Some(inner) => s = inner,
            None => return s,
        }
    }
}
