//! Upload filename and log sanitizing.

/// Reduce a user supplied filename to a safe single path component.
pub fn sanitize_filename_component(input: &str) -> String {
    // Keep only the last component of anything that looks like a path.
    let trimmed = input
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if trimmed.is_empty() {
        return "photo".to_string();
    }

    let mut out = String::with_capacity(trimmed.len().min(180));
    for c in trimmed.chars() {
        let forbidden = matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control();
        out.push(if forbidden { '_' } else { c });
        if out.len() >= 180 {
            break;
        }
    }

    let out = out.trim_matches([' ', '.']).to_string();
    if out.is_empty() {
        "photo".to_string()
    } else {
        out
    }
}

/// Shorten an image payload for logging (data URLs can be megabytes long).
pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let head: String = input.chars().take(max_chars).collect();
    format!("{head}…")
}
