//! Composite fallback keys for curation candidate nomination.
//!
//! Providers disagree on spelling, punctuation, and suffixes ("Kenneth
//! Walker III", "K.Walker", "Kenneth Walker"). The composite key folds a
//! display name with team and position into a deterministic string used ONLY
//! to surface candidates for human curation. It never replaces a canonical
//! identifier in published data.

/// Build the composite key: `normalized-name|TEAM|POS`. Missing team or
/// position become `?` so partial hints still bucket together.
#[must_use]
pub fn composite_key(name: &str, team: Option<&str>, position: Option<&str>) -> String {
    let fold = |part: Option<&str>| {
        part.map_or_else(
            || "?".to_string(),
            |p| p.trim().to_ascii_uppercase(),
        )
    };
    format!(
        "{}|{}|{}",
        normalize_name(name),
        fold(team),
        fold(position)
    )
}

/// Normalize a display name: lowercase, common Latin-1 diacritics folded to
/// ASCII, punctuation dropped, generational suffixes removed, whitespace
/// collapsed to single dashes.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

    let mut folded = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => folded.push('a'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'í' | 'ì' | 'î' | 'ï' => folded.push('i'),
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => folded.push('o'),
            'ú' | 'ù' | 'û' | 'ü' => folded.push('u'),
            'ñ' => folded.push('n'),
            'ç' => folded.push('c'),
            _ => folded.push(ch.to_ascii_lowercase()),
        }
    }

    let tokens: Vec<&str> = folded
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let trimmed: Vec<&str> = match tokens.split_last() {
        Some((last, rest)) if rest.len() > 1 && SUFFIXES.contains(last) => rest.to_vec(),
        _ => tokens,
    };

    trimmed.join("-")
}
