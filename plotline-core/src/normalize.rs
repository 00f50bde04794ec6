//! Normalization of raw math-editor input.
//!
//! Math editors hand over LaTeX-flavored text such as
//! `y=\left(\sin x\right)` or `\sqrt{x+1}`. The normalizer reduces that to
//! the plain syntax the lexer reads: it trims, keeps only the text after
//! the last `=`, strips `\left`/`\right`, maps the backslash function
//! names to plain ones, and rewrites `\sqrt{…}` into a `sqrt(…)` call.

use std::sync::OnceLock;

use regex::Regex;

fn sqrt_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\\sqrt\s*\{([^}]*)\}").expect("hard-coded pattern"))
}

fn command_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\\(left|right|sin|cos|tan|ln)").expect("hard-coded pattern")
    })
}

/// Reduce raw editor input to plain expression syntax.
///
/// Whitespace-only input becomes the empty string. When the text contains
/// `=`, only the part after the last one is kept, unless the `=` is the
/// final character.
#[must_use]
pub fn normalize_user_expression(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut text = match trimmed.rfind('=') {
        Some(pos) if pos + 1 < trimmed.len() => &trimmed[pos + 1..],
        _ => trimmed,
    }
    .to_string();

    text = command_pattern()
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            match caps[1].to_ascii_lowercase().as_str() {
                "left" | "right" => String::new(),
                // The editor's natural log maps onto the base-10 name the
                // original grapher used for it.
                "ln" => "log".to_string(),
                name => name.to_string(),
            }
        })
        .into_owned();

    text = sqrt_pattern().replace_all(&text, "sqrt($1)").into_owned();

    text.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
