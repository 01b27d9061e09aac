//! Locate JSON inside free-text model output
//!
//! Models wrap their JSON in prose or markdown fences no matter what the prompt
//! says. These helpers find the first balanced `[...]` (or `{...}`) that parses
//! as JSON. Brackets inside string literals are ignored while balancing.

use serde_json::Value;

/// First JSON array embedded in `text`
///
/// Tries each `[` in order and returns the first balanced slice that parses.
/// If no balanced slice parses, the first balanced slice is returned; if none
/// is balanced, the greedy slice from the first `[` to the last `]`. The
/// caller still has to parse the result.
pub fn extract_first_json_array(text: &str) -> Option<&str> {
    extract_first(text, '[', ']')
}

/// First JSON object embedded in `text`, same rules as
/// [`extract_first_json_array`]
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    extract_first(text, '{', '}')
}

fn extract_first(text: &str, open: char, close: char) -> Option<&str> {
    let mut first_balanced = None;

    for (start, _) in text.match_indices(open) {
        let Some(len) = balanced_len(&text[start..], open, close) else {
            continue;
        };
        let candidate = &text[start..start + len];
        if serde_json::from_str::<Value>(candidate).is_ok() {
            return Some(candidate);
        }
        first_balanced.get_or_insert(candidate);
    }

    first_balanced.or_else(|| greedy(text, open, close))
}

/// Byte length of the balanced group starting at `text[0] == open`
fn balanced_len(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(idx + ch.len_utf8());
            }
        }
    }

    None
}

fn greedy(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..end + close.len_utf8()])
}
