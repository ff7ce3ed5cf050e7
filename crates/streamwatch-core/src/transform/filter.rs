use crate::config::schema::AllowListDef;
use crate::error::StreamwatchError;
use crate::model::Dataset;
use std::collections::HashSet;

/// Keep records whose code is one of `def.codes`. Codes compare by displayed
/// value and exactly, so a numeric `7` matches `"7"` but `"RSP "` and `"RSP"`
/// are different codes. Returns the number removed.
pub fn allow_list(
    mut dataset: Dataset,
    def: &AllowListDef,
) -> Result<(Dataset, usize), StreamwatchError> {
    dataset.require_column(&def.field)?;

    let before = dataset.len();
    dataset.retain_records(|record| {
        record
            .get(&def.field)
            .filter(|v| !v.is_null())
            .map(ToString::to_string)
            .is_some_and(|code| def.codes.iter().any(|c| *c == code))
    });
    let removed = before - dataset.len();
    Ok((dataset, removed))
}

/// Remove records where `field` is null. Returns the number removed.
pub fn drop_null(mut dataset: Dataset, field: &str) -> Result<(Dataset, usize), StreamwatchError> {
    dataset.require_column(field)?;

    let before = dataset.len();
    dataset.retain_records(|record| record.get(field).is_some_and(|v| !v.is_null()));
    let removed = before - dataset.len();
    Ok((dataset, removed))
}

/// Keep the first record for each distinct key, in load order.
///
/// Keys compare by their displayed value; all null keys form one group.
pub fn dedup_by_key(
    mut dataset: Dataset,
    key: &str,
) -> Result<(Dataset, usize), StreamwatchError> {
    dataset.require_column(key)?;

    let before = dataset.len();
    let mut seen: HashSet<Option<String>> = HashSet::new();
    dataset.retain_records(|record| {
        let k = record
            .get(key)
            .filter(|v| !v.is_null())
            .map(ToString::to_string);
        seen.insert(k)
    });
    let removed = before - dataset.len();
    Ok((dataset, removed))
}
