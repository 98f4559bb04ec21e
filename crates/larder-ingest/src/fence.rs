//! Markdown code-fence stripping.
//!
//! Chat models frequently wrap JSON payloads in ```` ```json ... ``` ````
//! fences even when told not to. Strip the fence before parsing; text with
//! no fence passes through untouched.

/// Return the fenced payload if `raw` contains a closed code fence,
/// otherwise `raw` itself.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let Some(open) = raw.find("```") else {
        return raw;
    };
    let after = &raw[open + 3..];

    // An optional language tag occupies the rest of the opening line.
    let body_start = after.find('\n').map_or(0, |i| i + 1);
    let tagged = &after[body_start..];

    for candidate in [tagged, after] {
        if let Some(close) = candidate.rfind("```") {
            let inner = candidate[..close].trim();
            if !inner.is_empty() {
                return inner;
            }
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::strip_code_fence;

    #[test]
    fn json_tagged_fence_is_stripped() {
        let raw = "```json\n[\"사과\", \"우유\"]\n```";
        assert_eq!(strip_code_fence(raw), "[\"사과\", \"우유\"]");
    }

    #[test]
    fn bare_fence_is_stripped() {
        let raw = "```\n{\"ok\": true}\n```";
        assert_eq!(strip_code_fence(raw), "{\"ok\": true}");
    }

    #[test]
    fn single_line_fence_is_stripped() {
        assert_eq!(strip_code_fence("```[1, 2, 3]```"), "[1, 2, 3]");
    }

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_code_fence("[\"그대로\"]"), "[\"그대로\"]");
        assert_eq!(strip_code_fence(""), "");
    }

    #[test]
    fn surrounding_prose_is_discarded() {
        let raw = "Here you go:\n```json\n[\"쌀\"]\n```\nEnjoy!";
        assert_eq!(strip_code_fence(raw), "[\"쌀\"]");
    }
}
