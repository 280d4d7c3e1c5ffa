pub const DESCRIPTION_LIMIT: usize = 300;
pub const NO_DESCRIPTION: &str = "No description available.";

/// Card text for an AniList description: markup removed, line breaks flattened to
/// spaces, entities decoded, "(Source: ...)" credits dropped and the result cut
/// to `DESCRIPTION_LIMIT` characters. Paragraph breaks are not kept: a card
/// shows the description as one block of text.
pub fn clean_description(input: Option<&str>) -> String {
    let Some(raw) = input else {
        return NO_DESCRIPTION.to_string();
    };
    let without_tags = strip_html_with_breaks(raw);
    let decoded = decode_basic_html_entities(&without_tags);
    let without_sources = remove_source_blocks(&decoded);
    let flat = collapse_whitespace(&without_sources);
    if flat.is_empty() {
        return NO_DESCRIPTION.to_string();
    }
    truncate_chars(&flat, DESCRIPTION_LIMIT)
}

fn strip_html_with_breaks(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '<' {
            out.push(ch);
            continue;
        }
        let mut tag = String::new();
        for c in chars.by_ref() {
            if c == '>' {
                break;
            }
            tag.push(c);
        }
        let tag = tag.trim().trim_start_matches('/').trim();
        if tag.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("br")) {
            out.push(' ');
        }
    }
    out
}

fn decode_basic_html_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            out.push(ch);
            continue;
        }
        let mut entity = String::new();
        let mut terminated = false;
        while let Some(&c) = chars.peek() {
            if c == ';' {
                chars.next();
                terminated = true;
                break;
            }
            if !(c.is_ascii_alphanumeric() || c == '#') || entity.len() > 10 {
                break;
            }
            entity.push(c);
            chars.next();
        }
        let decoded = match entity.as_str() {
            _ if !terminated => None,
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some(' '),
            "mdash" => Some('\u{2014}'),
            "hellip" => Some('\u{2026}'),
            _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                u32::from_str_radix(&entity[2..], 16)
                    .ok()
                    .and_then(char::from_u32)
            }
            _ if entity.starts_with('#') => {
                entity[1..].parse::<u32>().ok().and_then(char::from_u32)
            }
            _ => None,
        };
        match decoded {
            Some(c) => out.push(c),
            None => {
                out.push('&');
                out.push_str(&entity);
                if terminated {
                    out.push(';');
                }
            }
        }
    }
    out
}

fn remove_source_blocks(input: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `input`.
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while let Some(pos) = lower[idx..].find("(source:") {
        let start = idx + pos;
        out.push_str(&input[idx..start]);
        match lower[start..].find(')') {
            Some(end_rel) => idx = start + end_rel + 1,
            None => {
                idx = input.len();
                break;
            }
        }
    }
    out.push_str(&input[idx..]);
    out
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(input: &str, limit: usize) -> String {
    match input.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", input[..cut].trim_end()),
        None => input.to_string(),
    }
}
