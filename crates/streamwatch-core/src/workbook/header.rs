/// Normalize a column header into a field name.
///
/// Steps:
/// 1. Replace each run of whitespace with a single underscore
/// 2. Remove every character that is not a letter, digit or underscore
///
/// Applying it twice gives the same result as applying it once.
pub fn normalize_column_name(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                spaced.push('_');
            }
            in_whitespace = true;
        } else {
            spaced.push(c);
            in_whitespace = false;
        }
    }

    spaced
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Build unique field names for a header row.
///
/// Blank header cells become `Unnamed_<column>`. A name that is already taken
/// gets the first free `_1`, `_2`, ... suffix.
pub fn column_names(header: &[Option<String>]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());

    for (idx, cell) in header.iter().enumerate() {
        let normalized = cell
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(normalize_column_name)
            .filter(|name| !name.is_empty());
        let base = normalized.unwrap_or_else(|| format!("Unnamed_{idx}"));

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        names.push(name);
    }

    names
}
