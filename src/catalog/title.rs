//! Franchise key derivation from display titles.
//!
//! This is a heuristic. It strips the usual season, part, cour, ordinal and
//! subtitle decorations so that sequels collapse onto the base title, and it will
//! both merge unrelated shows that share a base name and miss sequels that were
//! renamed outright.

use once_cell::sync::Lazy;
use regex::Regex;

/// A subtitle starts at ": " or a spaced dash. "Re:Zero" style colons without a
/// following space are part of the name.
static SUBTITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?::\s|\s[-–—]\s)").expect("subtitle pattern"));

/// Trailing decorations on an already-normalized key (lowercase, single spaces).
static TRAILING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\s(?:",
        r"(?:season|part|cour)\s(?:\d+|[ivx]+)",
        r"|\d+(?:st|nd|rd|th)\s(?:season|part|cour)",
        r"|(?:the\s)?(?:final|second|third|fourth|fifth|last)\s(?:season|part|cour|chapter)",
        r"|ii|iii|iv|vi|vii|viii|ix",
        r"|\d{1,2}",
        r")$"
    ))
    .expect("trailing marker pattern")
});

/// Grouping key for a display title.
pub fn franchise_key(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let base = match SUBTITLE.find(&lower) {
        Some(m) if m.start() > 0 => &lower[..m.start()],
        _ => lower.as_str(),
    };

    let full = normalize_title_key(&lower);
    let mut key = normalize_title_key(base);
    loop {
        let Some(m) = TRAILING_MARKER.find(&key) else {
            break;
        };
        if m.start() == 0 {
            break;
        }
        key.truncate(m.start());
    }

    if key.is_empty() {
        full
    } else {
        key
    }
}

/// Lowercases, turns every run of non-alphanumerics into one space and trims.
fn normalize_title_key(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_season_markers() {
        assert_eq!(franchise_key("Attack on Titan Season 2"), "attack on titan");
        assert_eq!(franchise_key("Attack on Titan: The Final Season"), "attack on titan");
        assert_eq!(
            franchise_key("Attack on Titan Final Season Part 2"),
            "attack on titan"
        );
        assert_eq!(franchise_key("My Hero Academia 2nd Season"), "my hero academia");
        assert_eq!(franchise_key("One-Punch Man - Season 2"), "one punch man");
    }

    #[test]
    fn strips_roman_and_small_numerals_only() {
        assert_eq!(franchise_key("Mob Psycho 100 II"), "mob psycho 100");
        assert_eq!(franchise_key("Mob Psycho 100"), "mob psycho 100");
        assert_eq!(franchise_key("Overlord IV"), "overlord");
        assert_eq!(franchise_key("Gintama 2"), "gintama");
    }

    #[test]
    fn subtitles_are_dropped() {
        assert_eq!(
            franchise_key("Demon Slayer: Kimetsu no Yaiba Entertainment District Arc"),
            "demon slayer"
        );
        assert_eq!(
            franchise_key("Re:ZERO -Starting Life in Another World- Season 2"),
            "re zero starting life in another world"
        );
    }

    #[test]
    fn never_reduces_to_empty() {
        assert_eq!(franchise_key("Season 2"), "season");
        assert_eq!(franchise_key("86"), "86");
        assert_eq!(franchise_key(""), "");
    }

    #[test]
    fn known_false_split() {
        // Same franchise, different base names.
        assert_ne!(franchise_key("Fate/stay night"), franchise_key("Fate/Zero"));
    }
}
