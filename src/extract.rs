use regex::Regex;

/// First capture group of `pattern` in `text`, if the pattern matches.
pub fn first_capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).expect("valid regex");
    re.captures(text).map(|cap| cap[1].to_string())
}

/// Decodes `\uXXXX` escape sequences left behind by embedded JSON blobs.
///
/// Handles surrogate pairs; a lone surrogate becomes U+FFFD. Anything that
/// is not a `\uXXXX` sequence passes through untouched.
pub fn decode_unicode_escapes(input: &str) -> String {
    let re = Regex::new(r"\\u([0-9a-fA-F]{4})(\\u([0-9a-fA-F]{4}))?").expect("valid regex");

    re.replace_all(input, |caps: &regex::Captures| {
        let first = u32::from_str_radix(&caps[1], 16).expect("4 hex digits");
        let second = caps
            .get(3)
            .map(|m| u32::from_str_radix(m.as_str(), 16).expect("4 hex digits"));

        match (first, second) {
            // High + low surrogate pair
            (0xD800..=0xDBFF, Some(low @ 0xDC00..=0xDFFF)) => {
                let cp = 0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00);
                char::from_u32(cp).unwrap_or('\u{FFFD}').to_string()
            }
            // Lone surrogate; decode the trailing escape on its own
            (0xD800..=0xDFFF, second) => {
                let mut out = String::from('\u{FFFD}');
                if let Some(cp) = second {
                    out.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
                }
                out
            }
            // Two independent BMP escapes matched together
            (cp, second) => {
                let mut out = String::new();
                out.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
                if let Some(cp2) = second {
                    out.push(char::from_u32(cp2).unwrap_or('\u{FFFD}'));
                }
                out
            }
        }
    })
    .into_owned()
}

/// First `max_chars` characters of `s` (not bytes, so multibyte text never
/// splits mid-character).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Up to `limit` context windows of ±`context` characters around each
/// occurrence of `key` in `content`.
pub fn keyword_contexts(content: &str, key: &str, context: usize, limit: usize) -> Vec<String> {
    let re = Regex::new(&regex::escape(key)).expect("valid regex");

    re.find_iter(content)
        .take(limit)
        .map(|m| {
            let start = floor_char_boundary(content, m.start().saturating_sub(context));
            let end = ceil_char_boundary(content, (m.end() + context).min(content.len()));
            content[start..end].to_string()
        })
        .collect()
}

/// Total number of occurrences of `key` in `content`.
pub fn keyword_count(content: &str, key: &str) -> usize {
    let re = Regex::new(&regex::escape(key)).expect("valid regex");
    re.find_iter(content).count()
}

/// Recovers a JSON array of objects from a file where console logs may
/// surround it, and returns the `id` field of each element.
pub fn scan_ids(content: &str) -> Option<Vec<String>> {
    let re = Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("valid regex");
    let json_str = re.find(content)?.as_str();

    let items: Vec<serde_json::Value> = serde_json::from_str(json_str).ok()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.get("id").and_then(|id| id.as_str()).map(String::from))
            .collect(),
    )
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
