use std::collections::BTreeMap;

use crate::model::{EmployeeRecord, MatchOutput, MatchedEmployee};

/// Partition two deduplicated sources by exact identifier.
///
/// Every identifier of either side lands in exactly one of `matches`,
/// `api_only` or `excel_only`. Output lists are in identifier order.
pub fn match_by_id(
    api: &BTreeMap<String, EmployeeRecord>,
    excel: &BTreeMap<String, EmployeeRecord>,
) -> MatchOutput {
    let mut matches = Vec::new();
    let mut api_only = Vec::new();
    let mut excel_only = Vec::new();

    for (id, api_rec) in api {
        if let Some(excel_rec) = excel.get(id) {
            matches.push(MatchedEmployee {
                api: api_rec.clone(),
                excel: excel_rec.clone(),
            });
        } else {
            api_only.push(api_rec.clone());
        }
    }

    for (id, excel_rec) in excel {
        if !api.contains_key(id) {
            excel_only.push(excel_rec.clone());
        }
    }

    log::info!(
        "matched {} IDs, {} API-only, {} Excel-only",
        matches.len(),
        api_only.len(),
        excel_only.len()
    );

    MatchOutput {
        matches,
        api_only,
        excel_only,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchGroup, Source};

    fn side(source: Source, ids: &[&str]) -> BTreeMap<String, EmployeeRecord> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                (
                    id.to_string(),
                    EmployeeRecord {
                        id: id.to_string(),
                        source,
                        row: i,
                        fields: BTreeMap::new(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn overlapping_sources() {
        let api = side(Source::Api, &["1", "2", "3"]);
        let excel = side(Source::Excel, &["2", "3", "4"]);
        let out = match_by_id(&api, &excel);
        assert_eq!(out.ids(MatchGroup::Matches), vec!["2", "3"]);
        assert_eq!(out.ids(MatchGroup::ApiOnly), vec!["1"]);
        assert_eq!(out.ids(MatchGroup::ExcelOnly), vec!["4"]);
        assert_eq!(out.matches[0].api.source, Source::Api);
        assert_eq!(out.matches[0].excel.source, Source::Excel);
    }

    #[test]
    fn disjoint_sources() {
        let api = side(Source::Api, &["a", "b"]);
        let excel = side(Source::Excel, &["c"]);
        let out = match_by_id(&api, &excel);
        assert_eq!(out.len(MatchGroup::Matches), 0);
        assert_eq!(out.len(MatchGroup::ApiOnly), 2);
        assert_eq!(out.len(MatchGroup::ExcelOnly), 1);
    }

    #[test]
    fn empty_sources() {
        let out = match_by_id(&BTreeMap::new(), &BTreeMap::new());
        for group in MatchGroup::ALL {
            assert_eq!(out.len(group), 0);
        }
    }

    #[test]
    fn ids_are_case_sensitive() {
        let api = side(Source::Api, &["ab1"]);
        let excel = side(Source::Excel, &["AB1"]);
        let out = match_by_id(&api, &excel);
        assert_eq!(out.len(MatchGroup::Matches), 0);
        assert_eq!(out.len(MatchGroup::ApiOnly), 1);
        assert_eq!(out.len(MatchGroup::ExcelOnly), 1);
    }
}
