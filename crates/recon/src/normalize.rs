use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::config::{DedupPolicy, SourceConfig};
use crate::model::{
    DuplicateId, EmployeeRecord, IntegrityWarning, NormalizedSource, Source, SourceRow,
    SourceSummary,
};

/// Standardize a raw identifier. Returns `None` for missing/blank values.
///
/// Whitespace is trimmed, an integral decimal rendering (`"12345.0"`, as
/// spreadsheet numbers often come out) loses its zero fraction, and all-digit
/// identifiers shorter than `pad_width` are left-padded with zeros.
pub fn standardize_id(raw: &str, pad_width: Option<usize>) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut id = strip_zero_fraction(trimmed).to_string();

    if let Some(width) = pad_width {
        if id.len() < width && id.bytes().all(|b| b.is_ascii_digit()) {
            id = format!("{id:0>width$}");
        }
    }

    Some(id)
}

fn strip_zero_fraction(s: &str) -> &str {
    if let Some((int, frac)) = s.split_once('.') {
        let int_ok = !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit());
        let frac_zero = !frac.is_empty() && frac.bytes().all(|b| b == b'0');
        if int_ok && frac_zero {
            return int;
        }
    }
    s
}

/// Drop rows without an identifier and deduplicate the rest by identifier.
pub fn normalize(
    source: Source,
    rows: &[SourceRow],
    id_field: &str,
    fields: &SourceConfig,
    policy: DedupPolicy,
) -> NormalizedSource {
    let mut records: BTreeMap<String, EmployeeRecord> = BTreeMap::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut seen_order: Vec<String> = Vec::new();
    let mut warnings = Vec::new();
    let mut empty_ids = 0;

    for (row_idx, row) in rows.iter().enumerate() {
        let id = match row
            .get(id_field)
            .and_then(|raw| standardize_id(raw, fields.pad_width))
        {
            Some(id) => id,
            None => {
                empty_ids += 1;
                warnings.push(IntegrityWarning::EmptyId { source, row: row_idx });
                continue;
            }
        };

        let count = occurrences.entry(id.clone()).or_insert(0);
        if *count == 0 {
            seen_order.push(id.clone());
        }
        *count += 1;

        match records.entry(id) {
            Entry::Vacant(slot) => {
                let id = slot.key().clone();
                slot.insert(EmployeeRecord {
                    id,
                    source,
                    row: row_idx,
                    fields: row.clone(),
                });
            }
            Entry::Occupied(mut slot) => match policy {
                DedupPolicy::First => {}
                DedupPolicy::Last => {
                    let kept = slot.get_mut();
                    kept.row = row_idx;
                    kept.fields = row.clone();
                }
                DedupPolicy::Merge => {
                    let kept = slot.get_mut();
                    for (key, value) in row {
                        if value.trim().is_empty() {
                            continue;
                        }
                        let missing = kept
                            .fields
                            .get(key)
                            .map_or(true, |existing| existing.trim().is_empty());
                        if missing {
                            kept.fields.insert(key.clone(), value.clone());
                        }
                    }
                }
            },
        }
    }

    let mut duplicate_ids = Vec::new();
    let mut duplicates_removed = 0;
    for id in seen_order {
        let n = occurrences[&id];
        if n > 1 {
            duplicates_removed += n - 1;
            warnings.push(IntegrityWarning::DuplicateId {
                source,
                id: id.clone(),
                occurrences: n,
            });
            duplicate_ids.push(DuplicateId { id, occurrences: n });
        }
    }

    for warning in &warnings {
        log::warn!("{warning}");
    }
    log::info!(
        "{source}: {} rows, {empty_ids} empty IDs, {duplicates_removed} duplicates removed, {} unique",
        rows.len(),
        records.len()
    );

    NormalizedSource {
        summary: SourceSummary {
            source,
            total_rows: rows.len(),
            empty_ids,
            duplicate_ids,
            duplicates_removed,
            final_unique: records.len(),
        },
        records,
        warnings,
    }
}
