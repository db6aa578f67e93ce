use crate::error::Error;
use crate::Result;

/// Normalize an application name into an environment variable key stem.
///
/// Uppercases, collapses whitespace/dash/underscore runs into a single
/// underscore, and strips every other non-alphanumeric character. The
/// `_IMAGE` suffix is appended by the caller.
pub(crate) fn normalize(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("App name cannot be empty"));
    }

    let mut out = String::new();
    let mut prev_was_underscore = false;

    for ch in trimmed.chars() {
        let normalized = match ch {
            'A'..='Z' | '0'..='9' => Some(ch),
            'a'..='z' => Some(ch.to_ascii_uppercase()),
            _ if ch.is_whitespace() || ch == '_' || ch == '-' => Some('_'),
            _ => None,
        };

        if let Some(c) = normalized {
            if c == '_' {
                if out.is_empty() || prev_was_underscore {
                    continue;
                }
                out.push('_');
                prev_was_underscore = true;
            } else {
                out.push(c);
                prev_was_underscore = false;
            }
        }
    }

    while out.ends_with('_') {
        out.pop();
    }

    if out.is_empty() {
        return Err(Error::validation(format!(
            "App name '{}' must contain at least one letter or number",
            name
        )));
    }

    Ok(out)
}
