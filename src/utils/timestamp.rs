use chrono::Local;

/// Sortable timestamp used to key one build or deploy invocation.
///
/// Fixed-width numeric form so lexicographic ordering of snapshot
/// filenames matches chronological ordering.
pub fn now() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}
