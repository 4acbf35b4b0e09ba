use lazy_static::lazy_static;
use regex::{Regex, RegexSet};

// Default cap on a chat message after cleaning
pub const DEFAULT_MAX_LENGTH: usize = 500;

lazy_static! {
    // Stripped in order; elements take their content with them. No word
    // boundary after the tag name, so any opener before a closer is removed
    static ref STRIP_PATTERNS: Vec<Regex> = [
        r"(?is)<script.*?</script\s*>",
        r"(?is)<iframe.*?</iframe\s*>",
        r"(?is)<object.*?</object\s*>",
        r"(?is)<embed.*?</embed\s*>",
        r"(?i)javascript:",
        r"(?i)data:text/html",
        r"(?i)vbscript:",
        r"(?i)on\w+\s*=",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect();

    static ref SUSPICIOUS: RegexSet = RegexSet::new(SUSPICIOUS_PATTERNS.iter().map(|(_, p)| *p)).unwrap();
}

// (label, pattern) pairs checked by the content classifier
const SUSPICIOUS_PATTERNS: [(&str, &str); 12] = [
    ("script_tag", r"(?i)<script"),
    ("javascript_uri", r"(?i)javascript:"),
    ("vbscript_uri", r"(?i)vbscript:"),
    ("event_handler", r"(?i)on\w+\s*="),
    ("iframe_tag", r"(?i)<iframe"),
    ("object_tag", r"(?i)<object"),
    ("embed_tag", r"(?i)<embed"),
    ("html_data_uri", r"(?i)data:text/html"),
    ("eval_call", r"(?i)\beval\s*\("),
    ("function_ctor", r"(?i)\bFunction\s*\("),
    ("set_timeout", r"(?i)\bsetTimeout\s*\("),
    ("set_interval", r"(?i)\bsetInterval\s*\("),
];

/// Strip known-dangerous markup and URI schemes from free text.
///
/// This is a textual blocklist, not an HTML parser. Patterns are reapplied
/// until nothing changes, so fragments that reassemble into a blocked
/// pattern after a removal are caught too. The result is trimmed and holds
/// at most `max_length` characters.
pub fn sanitize(input: &str, max_length: usize) -> String {
    let mut text = input.trim().to_string();

    loop {
        let mut changed = false;
        for pattern in STRIP_PATTERNS.iter() {
            let stripped = pattern.replace_all(&text, "").into_owned();
            if stripped != text {
                text = stripped;
                changed = true;
            }
        }
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            text = trimmed.to_string();
            changed = true;
        }
        if !changed {
            break;
        }
    }

    let truncated: String = text.chars().take(max_length).collect();
    truncated.trim_end().to_string()
}

/// True when any suspicious pattern appears in `input`.
pub fn contains_suspicious_content(input: &str) -> bool {
    SUSPICIOUS.is_match(input)
}

/// Labels of every suspicious pattern found in `input`, for audit logging.
pub fn suspicious_matches(input: &str) -> Vec<&'static str> {
    SUSPICIOUS
        .matches(input)
        .into_iter()
        .map(|idx| SUSPICIOUS_PATTERNS[idx].0)
        .collect()
}
