//! Layered JSON extraction (spec §4.2 step 4). Each layer is independently
//! testable and the ladder stops at the first one that produces valid JSON.

use serde_json::Value;

/// Runs the full extraction ladder: direct parse, fenced code block, first
/// balanced `{...}`/`[...]` substring, common-mistake cleanup, in that
/// order. Returns `None` only if every layer fails.
pub fn extract_json(raw: &str) -> Option<Value> {
    direct_parse(raw)
        .or_else(|| fenced_block(raw).and_then(|s| direct_parse(&s)))
        .or_else(|| balanced_substring(raw).and_then(|s| direct_parse(&s)))
        .or_else(|| {
            let cleaned = clean_common_mistakes(raw);
            direct_parse(&cleaned)
        })
        .or_else(|| {
            fenced_block(raw)
                .map(|s| clean_common_mistakes(&s))
                .and_then(|s| direct_parse(&s))
        })
        .or_else(|| {
            balanced_substring(raw)
                .map(|s| clean_common_mistakes(&s))
                .and_then(|s| direct_parse(&s))
        })
}

fn direct_parse(raw: &str) -> Option<Value> {
    serde_json::from_str(raw.trim()).ok()
}

/// Extracts the contents of a ` ```json ... ``` ` (or bare ` ``` `) fence.
fn fenced_block(raw: &str) -> Option<String> {
    let start_marker_json = "```json";
    let start_marker_bare = "```";

    let (body_start, marker_len) = if let Some(pos) = raw.find(start_marker_json) {
        (pos, start_marker_json.len())
    } else if let Some(pos) = raw.find(start_marker_bare) {
        (pos, start_marker_bare.len())
    } else {
        return None;
    };

    let after_marker = &raw[body_start + marker_len..];
    let end = after_marker.find("```")?;
    Some(after_marker[..end].trim().to_string())
}

/// Finds the first balanced `{...}` or `[...]` substring, tolerating nested
/// braces and quoted strings.
fn balanced_substring(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    for (start, &b) in bytes.iter().enumerate() {
        if b != b'{' && b != b'[' {
            continue;
        }
        let open = b;
        let close = if open == b'{' { b'}' } else { b']' };
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &cur) in bytes[start..].iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if cur == b'\\' {
                    escaped = true;
                } else if cur == b'"' {
                    in_string = false;
                }
                continue;
            }
            match cur {
                b'"' => in_string = true,
                c if c == open => depth += 1,
                c if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset + 1;
                        return Some(raw[start..end].to_string());
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// Repairs the common mistakes free-form LLM output makes: trailing commas,
/// unquoted keys, single-quoted strings, Python-style literals, `//`/`#`
/// line comments.
fn clean_common_mistakes(raw: &str) -> String {
    let no_comments = strip_line_comments(raw);
    let no_trailing_commas = strip_trailing_commas(&no_comments);
    let quoted_keys = quote_bare_keys(&no_trailing_commas);
    let single_to_double = normalize_quotes(&quoted_keys);
    normalize_literals(&single_to_double)
}

fn strip_line_comments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
        } else if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}

fn strip_trailing_commas(raw: &str) -> String {
    let re = regex::Regex::new(r",\s*([}\]])").expect("static regex");
    re.replace_all(raw, "$1").to_string()
}

fn quote_bare_keys(raw: &str) -> String {
    let re = regex::Regex::new(r"(?m)([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*:)")
        .expect("static regex");
    re.replace_all(raw, "$1\"$2\"$3").to_string()
}

fn normalize_quotes(raw: &str) -> String {
    let re = regex::Regex::new(r"'([^'\\]*(?:\\.[^'\\]*)*)'").expect("static regex");
    re.replace_all(raw, "\"$1\"").to_string()
}

fn normalize_literals(raw: &str) -> String {
    let re = regex::Regex::new(r"\bTrue\b|\bFalse\b|\bNone\b").expect("static regex");
    re.replace_all(raw, |caps: &regex::Captures| match &caps[0] {
        "True" => "true",
        "False" => "false",
        _ => "null",
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_parse_handles_plain_json() {
        let raw = r#"{"a": 1}"#;
        assert_eq!(extract_json(raw), Some(json!({"a": 1})));
    }

    #[test]
    fn extracts_from_fenced_code_block() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks!";
        assert_eq!(extract_json(raw), Some(json!({"a": 1})));
    }

    #[test]
    fn extracts_first_balanced_object_from_prose() {
        let raw = "Sure, the result is {\"a\": {\"b\": 2}} as requested.";
        assert_eq!(extract_json(raw), Some(json!({"a": {"b": 2}})));
    }

    #[test]
    fn cleans_trailing_commas_and_bare_keys() {
        let raw = "{a: 1, b: [1, 2, 3,],}";
        assert_eq!(extract_json(raw), Some(json!({"a": 1, "b": [1, 2, 3]})));
    }

    #[test]
    fn cleans_single_quotes_and_python_literals() {
        let raw = "{'ok': True, 'missing': None}";
        assert_eq!(extract_json(raw), Some(json!({"ok": true, "missing": null})));
    }

    #[test]
    fn gives_up_on_unrecoverable_garbage() {
        assert_eq!(extract_json("not json at all, sorry"), None);
    }
}
