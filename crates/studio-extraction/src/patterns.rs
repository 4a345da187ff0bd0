//! Ordered pattern matchers for structural markers

use regex::Regex;

/// Extract the trimmed body of an explicit `<tag>...</tag>` marker
///
/// Matching is case-insensitive and spans newlines. Returns an empty string
/// when the tag is absent.
#[must_use]
pub fn extract_tag(content: &str, tag: &str) -> String {
    let re = Regex::new(&format!(r"(?si)<{tag}>(.*?)</{tag}>")).unwrap();
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Extract a code block: `<code>` tag first, fenced-block fallback second
#[must_use]
pub fn extract_code(content: &str) -> String {
    let tagged = extract_tag(content, "code");
    if !tagged.is_empty() {
        return tagged;
    }

    let fence = Regex::new(r"(?s)```(?:sketchlang)?\s*\n(.*?)\n```").unwrap();
    fence
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Extract sketch code with the full fallback chain
///
/// Priority order: `<contours>` tag, `<code>` tag, fenced block. Planning
/// responses carry their skeleton under `<contours>`; expansion responses
/// typically use `<code>`.
#[must_use]
pub fn extract_sketch_code(content: &str) -> String {
    let contours = extract_tag(content, "contours");
    if !contours.is_empty() {
        return contours;
    }
    extract_code(content)
}

/// Extract a tag carried inside `#` comments of a code block
///
/// Fallback for sub-artifact contexts where the model put metadata into the
/// code itself. Tries the single-line form (`# <tag>value</tag>`) first,
/// then a multi-line comment-block form where the open and close markers
/// appear on their own commented lines.
#[must_use]
pub fn extract_comment_tag(content: &str, tag: &str) -> String {
    let single = Regex::new(&format!(r"(?i)#\s*<{tag}>(.+?)</{tag}>")).unwrap();
    if let Some(caps) = single.captures(content)
        && let Some(m) = caps.get(1)
    {
        return m.as_str().trim().to_string();
    }

    let open = Regex::new(&format!(r"(?i)#\s*<{tag}>")).unwrap();
    let close = Regex::new(&format!(r"(?i)#?\s*</{tag}>")).unwrap();

    let mut collected: Vec<String> = Vec::new();
    let mut in_tag = false;

    for line in content.lines() {
        if !in_tag {
            if open.is_match(line) {
                in_tag = true;
                // Capture any trailing text on the opening line
                let after: Vec<&str> = open.splitn(line, 2).collect();
                if let Some(rest) = after.get(1) {
                    let rest = rest.trim();
                    if !rest.is_empty() {
                        collected.push(rest.to_string());
                    }
                }
            }
            continue;
        }

        if close.is_match(line) {
            break;
        }

        let cleaned = line.trim().trim_start_matches('#').trim();
        if !cleaned.is_empty() {
            collected.push(cleaned.to_string());
        }
    }

    collected.join("\n").trim().to_string()
}
