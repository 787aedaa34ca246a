//! Symbol-font character mapping
//!
//! Word stores characters typed in legacy symbol fonts as
//! `<w:sym w:font="Symbol" w:char="F061"/>` references rather than Unicode
//! text. This module maps (font, character code) pairs onto Unicode strings.
//! Lookup is case-insensitive in both arguments and requires an exact code
//! match; unknown pairs return `None` and the caller decides the fallback.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Code points the Symbol font exposes through Word's `F0xx` private-use
/// range. Layout follows the Adobe Symbol encoding.
const SYMBOL: &[(&str, &str)] = &[
    // Lowercase Greek
    ("F061", "α"),
    ("F062", "β"),
    ("F063", "χ"),
    ("F064", "δ"),
    ("F065", "ε"),
    ("F066", "φ"),
    ("F067", "γ"),
    ("F068", "η"),
    ("F069", "ι"),
    ("F06A", "ϕ"),
    ("F06B", "κ"),
    ("F06C", "λ"),
    ("F06D", "μ"),
    ("F06E", "ν"),
    ("F06F", "ο"),
    ("F070", "π"),
    ("F071", "θ"),
    ("F072", "ρ"),
    ("F073", "σ"),
    ("F074", "τ"),
    ("F075", "υ"),
    ("F076", "ϖ"),
    ("F077", "ω"),
    ("F078", "ξ"),
    ("F079", "ψ"),
    ("F07A", "ζ"),
    // Uppercase Greek
    ("F041", "Α"),
    ("F042", "Β"),
    ("F043", "Χ"),
    ("F044", "Δ"),
    ("F045", "Ε"),
    ("F046", "Φ"),
    ("F047", "Γ"),
    ("F048", "Η"),
    ("F049", "Ι"),
    ("F04A", "ϑ"),
    ("F04B", "Κ"),
    ("F04C", "Λ"),
    ("F04D", "Μ"),
    ("F04E", "Ν"),
    ("F04F", "Ο"),
    ("F050", "Π"),
    ("F051", "Θ"),
    ("F052", "Ρ"),
    ("F053", "Σ"),
    ("F054", "Τ"),
    ("F055", "Υ"),
    ("F056", "ς"),
    ("F057", "Ω"),
    ("F058", "Ξ"),
    ("F059", "Ψ"),
    ("F05A", "Ζ"),
    // Operators and relations
    ("F0A2", "′"),
    ("F0A3", "≤"),
    ("F0A5", "∞"),
    ("F0B0", "°"),
    ("F0B1", "±"),
    ("F0B3", "≥"),
    ("F0B4", "×"),
    ("F0B5", "∝"),
    ("F0B6", "∂"),
    ("F0B7", "•"),
    ("F0B8", "÷"),
    ("F0B9", "≠"),
    ("F0BA", "≡"),
    ("F0BB", "≈"),
    ("F0BC", "…"),
    ("F0C7", "∩"),
    ("F0C8", "∪"),
    ("F0C9", "⊃"),
    ("F0CA", "⊇"),
    ("F0CC", "⊂"),
    ("F0CD", "⊆"),
    ("F0CE", "∈"),
    ("F0CF", "∉"),
    ("F0D1", "∇"),
    ("F0D5", "∏"),
    ("F0D6", "√"),
    ("F0D7", "⋅"),
    ("F0D8", "¬"),
    ("F0D9", "∧"),
    ("F0DA", "∨"),
    ("F0DB", "⇔"),
    ("F0DE", "⇒"),
    ("F0E5", "∑"),
    ("F0F2", "∫"),
    // Arrows
    ("F0AC", "←"),
    ("F0AD", "↑"),
    ("F0AE", "→"),
    ("F0AF", "↓"),
];

/// The MT Extra glyphs that show up in MathType fallback runs.
const MT_EXTRA: &[(&str, &str)] = &[
    ("F04F", "ℏ"),
    ("F060", "ℓ"),
    ("F0B2", "↼"),
    ("F0B6", "⇀"),
    ("F0BC", "⋯"),
    ("F04D", "⋱"),
];

static TABLE: Lazy<HashMap<&'static str, HashMap<String, &'static str>>> = Lazy::new(|| {
    let mut fonts = HashMap::new();
    for (font, codes) in [("symbol", SYMBOL), ("mt extra", MT_EXTRA)] {
        let by_code: HashMap<String, &'static str> = codes
            .iter()
            .map(|(code, text)| (code.to_ascii_uppercase(), *text))
            .collect();
        fonts.insert(font, by_code);
    }
    fonts
});

/// Look up the Unicode text for a symbol-font character reference.
///
/// Both the font name and the character code are matched case-insensitively.
/// Returns `None` for any (font, code) pair the table does not carry; the
/// table never fabricates a value.
pub fn lookup(font: &str, code: &str) -> Option<&'static str> {
    TABLE
        .get(font.trim().to_ascii_lowercase().as_str())
        .and_then(|codes| codes.get(code.trim().to_ascii_uppercase().as_str()))
        .copied()
}

/// Enumerate the supported fonts.
pub fn fonts() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TABLE.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Enumerate the supported character codes for one font, or `None` if the
/// font itself is unknown.
pub fn codes(font: &str) -> Option<Vec<String>> {
    TABLE
        .get(font.trim().to_ascii_lowercase().as_str())
        .map(|codes| {
            let mut all: Vec<String> = codes.keys().cloned().collect();
            all.sort_unstable();
            all
        })
}
