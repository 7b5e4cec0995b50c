use crate::models::query::RecordQuery;
use crate::models::record::Record;
use std::cmp::Ordering;

/// Filters, sorts and pages a collection snapshot.
///
/// Filters run in order `txt`, `minSeverity`, `labels`; the sort is stable so
/// ties keep collection order (newest first).
pub fn run_query(records: &[Record], query: &RecordQuery) -> Vec<Record> {
    let txt = query.text();
    let labels = query.label_list();

    let mut visible: Vec<&Record> = records
        .iter()
        .filter(|record| txt.as_deref().is_none_or(|txt| matches_text(record, txt)))
        .filter(|record| query.min_severity.is_none_or(|min| record.severity >= min))
        .filter(|record| labels.as_deref().is_none_or(|labels| record.has_any_label(labels)))
        .collect();

    if let Some(sort_by) = query.sort_by.as_deref() {
        let ascending = query.is_ascending();
        visible.sort_by(|a, b| {
            let ordering = compare_by(a, b, sort_by);
            if ascending { ordering } else { ordering.reverse() }
        });
    }

    visible
        .into_iter()
        .skip(query.offset())
        .take(query.effective_page_size())
        .cloned()
        .collect()
}

fn matches_text(record: &Record, txt: &str) -> bool {
    record.title.to_lowercase().contains(txt) || record.description.to_lowercase().contains(txt)
}

/// Unknown attributes compare equal, which leaves the order untouched.
fn compare_by(a: &Record, b: &Record, attribute: &str) -> Ordering {
    match attribute {
        "title" => a.title.cmp(&b.title),
        "description" => a.description.cmp(&b.description),
        "severity" => a.severity.cmp(&b.severity),
        "createdAt" | "created_at" => a.created_at.cmp(&b.created_at),
        "_id" | "id" => a.id.cmp(&b.id),
        _ => Ordering::Equal,
    }
}
