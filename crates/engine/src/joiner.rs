use std::collections::HashSet;

use crate::model::{
    Addressed, AddressRecord, BylawRecords, Deficiency, FireRecords, Inspection, Investigation,
    MatchOptions, MatchResult,
};
use crate::resolver::resolve;

/// Resolve `query` against `dataset` and keep the rows at the top candidate.
///
/// Returns the resolved address, the remaining candidates, and the rows whose
/// address equals the resolved value exactly. `None` when nothing clears the
/// threshold.
fn locate<'a, R: Addressed>(
    query: &str,
    dataset: &'a [R],
    options: &MatchOptions,
) -> Option<(String, Vec<String>, Vec<&'a R>)> {
    let mut candidates = resolve(query, dataset, options).into_iter();
    let top = candidates.next()?;
    let suggestions: Vec<String> = candidates.map(|c| c.address).collect();

    let rows: Vec<&R> = dataset
        .iter()
        .filter(|r| r.address() == top.address)
        .collect();

    tracing::debug!(
        column = R::ADDRESS_COLUMN,
        address = %top.address,
        score = top.score,
        rows = rows.len(),
        "resolved address"
    );
    Some((top.address, suggestions, rows))
}

/// Bylaw lookup: address → investigation ids → investigations + deficiencies.
pub fn search_bylaw(
    query: &str,
    addresses: &[AddressRecord],
    investigations: &[Investigation],
    deficiencies: &[Deficiency],
    options: &MatchOptions,
) -> MatchResult<BylawRecords> {
    let Some((address, suggestions, rows)) = locate(query, addresses, options) else {
        return MatchResult::NotFound { suggestions: Vec::new() };
    };

    let ids: HashSet<&str> = rows.iter().map(|r| r.investigation_id.as_str()).collect();

    let investigations: Vec<Investigation> = investigations
        .iter()
        .filter(|i| ids.contains(i.investigation_id.as_str()))
        .cloned()
        .collect();
    let deficiencies: Vec<Deficiency> = deficiencies
        .iter()
        .filter(|d| ids.contains(d.investigation_id.as_str()))
        .cloned()
        .collect();

    MatchResult::Found {
        address,
        suggestions,
        records: BylawRecords {
            investigations,
            deficiencies,
        },
    }
}

/// Fire lookup: the inspection rows at the resolved address are the result.
pub fn search_fire(
    query: &str,
    inspections: &[Inspection],
    options: &MatchOptions,
) -> MatchResult<FireRecords> {
    let Some((address, suggestions, rows)) = locate(query, inspections, options) else {
        return MatchResult::NotFound { suggestions: Vec::new() };
    };

    MatchResult::Found {
        address,
        suggestions,
        records: FireRecords {
            inspections: rows.into_iter().cloned().collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(line: &str, id: &str) -> AddressRecord {
        AddressRecord {
            addr_line: line.into(),
            investigation_id: id.into(),
        }
    }

    fn inv(id: &str, status: &str) -> Investigation {
        Investigation {
            investigation_id: id.into(),
            issue: format!("issue {id}"),
            in_type: "Complaint".into(),
            status: status.into(),
            in_date: "2020-01-01".into(),
        }
    }

    fn def(id: &str, desc: &str) -> Deficiency {
        Deficiency {
            investigation_id: id.into(),
            desc: desc.into(),
            location: "Lobby".into(),
            status: "Open".into(),
        }
    }

    fn insp(address: &str, date: &str) -> Inspection {
        Inspection {
            property_address: address.into(),
            open_date: date.into(),
            violation_description: "Blocked exit".into(),
        }
    }

    #[test]
    fn bylaw_joins_by_identifier_set() {
        let addresses = vec![
            addr("123 MAIN STREET", "1"),
            addr("123 MAIN STREET", "2"),
            addr("50 KING ST W", "3"),
        ];
        let investigations = vec![inv("1", "Closed"), inv("2", "Open"), inv("3", "Open")];
        let deficiencies = vec![def("2", "Broken door"), def("3", "Mould"), def("9", "Orphan")];

        let result = search_bylaw(
            "123 Main St",
            &addresses,
            &investigations,
            &deficiencies,
            &MatchOptions::default(),
        );
        assert_eq!(result.address(), Some("123 MAIN STREET"));
        let records = result.records().unwrap();
        let ids: Vec<&str> = records.investigations.iter().map(|i| i.investigation_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(records.deficiencies.len(), 1);
        assert_eq!(records.deficiencies[0].desc, "Broken door");
    }

    #[test]
    fn bylaw_found_with_no_deficiencies_is_empty_table() {
        let addresses = vec![addr("1 YONGE ST", "7")];
        let investigations = vec![inv("7", "Closed")];
        let result = search_bylaw("1 yonge st", &addresses, &investigations, &[], &MatchOptions::default());
        assert!(result.is_found());
        let records = result.records().unwrap();
        assert_eq!(records.investigations.len(), 1);
        assert!(records.deficiencies.is_empty());
    }

    #[test]
    fn bylaw_missing_related_rows_yield_empty_join() {
        let addresses = vec![addr("1 YONGE ST", "404")];
        let result = search_bylaw("1 yonge st", &addresses, &[inv("1", "Open")], &[], &MatchOptions::default());
        let records = result.records().unwrap();
        assert!(records.investigations.is_empty());
    }

    #[test]
    fn not_found_has_empty_suggestions() {
        let addresses = vec![addr("123 MAIN STREET", "1")];
        let result = search_bylaw("999 Nonexistent Ave", &addresses, &[], &[], &MatchOptions::default());
        assert_eq!(result, MatchResult::NotFound { suggestions: vec![] });
    }

    #[test]
    fn exact_match_on_resolved_value_is_case_sensitive() {
        // Both spellings score 100, lexicographic tie-break picks the uppercase one
        let inspections = vec![
            insp("20 BLOOR ST E", "2020-01-01"),
            insp("20 Bloor St E", "2021-01-01"),
            insp("20 BLOOR ST E", "2022-01-01"),
        ];
        let result = search_fire("20 bloor st e", &inspections, &MatchOptions::default());
        assert_eq!(result.address(), Some("20 BLOOR ST E"));
        assert_eq!(result.suggestions(), &["20 Bloor St E".to_string()]);
        let rows = &result.records().unwrap().inspections;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.property_address == "20 BLOOR ST E"));
    }

    #[test]
    fn suggestions_are_remaining_candidates() {
        let inspections = vec![
            insp("10 BAY ST", "2020-01-01"),
            insp("12 BAY ST", "2020-01-01"),
            insp("700 BAY ST", "2020-01-01"),
        ];
        let result = search_fire("10 bay st", &inspections, &MatchOptions::default());
        assert_eq!(result.address(), Some("10 BAY ST"));
        assert_eq!(result.suggestions(), &["12 BAY ST".to_string(), "700 BAY ST".to_string()]);
    }

    #[test]
    fn repeated_search_is_identical() {
        let inspections = vec![insp("10 BAY ST", "2020-01-01"), insp("12 BAY ST", "2021-01-01")];
        let a = search_fire("10 Bay St.", &inspections, &MatchOptions::default());
        let b = search_fire("10 Bay St.", &inspections, &MatchOptions::default());
        assert_eq!(a, b);
    }
}
