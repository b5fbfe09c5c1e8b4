use crate::RemoteEntry;

/// Allowed file-name suffixes, matched case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    suffixes: Vec<String>,
}

impl FilterSet {
    /// Builds the set, keeping the first occurrence of duplicated suffixes.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for s in suffixes {
            let s = s.into();
            if !out.contains(&s) {
                out.push(s);
            }
        }
        Self { suffixes: out }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.suffixes.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtered {
    pub kept: Vec<RemoteEntry>,
    /// Names of entries rejected by the filter, in listing order.
    pub skipped: Vec<String>,
}

pub fn filter_eligible(entries: Vec<RemoteEntry>, filter: &FilterSet) -> Filtered {
    let mut out = Filtered::default();
    for entry in entries {
        if filter.matches(&entry.name) {
            out.kept.push(entry);
        } else {
            out.skipped.push(entry.name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> RemoteEntry {
        RemoteEntry {
            id: format!("id-{name}"),
            name: name.to_string(),
            mime_type: "application/octet-stream".into(),
            size: None,
        }
    }

    #[test]
    fn keeps_input_order_and_reports_skipped_names() {
        let filter = FilterSet::new([".txt", ".pdf"]);
        let out = filter_eligible(
            vec![entry("b.pdf"), entry("x.csv"), entry("a.txt"), entry("y")],
            &filter,
        );
        let kept: Vec<_> = out.kept.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(kept, vec!["b.pdf", "a.txt"]);
        assert_eq!(out.skipped, vec!["x.csv", "y"]);
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let filter = FilterSet::new([".pdf"]);
        let out = filter_eligible(vec![entry("REPORT.PDF"), entry("report.pdf")], &filter);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.kept[0].name, "report.pdf");
        assert_eq!(out.skipped, vec!["REPORT.PDF"]);
    }

    #[test]
    fn duplicate_suffixes_collapse() {
        let filter = FilterSet::new([".txt", ".md", ".txt"]);
        assert_eq!(filter.suffixes(), &[".txt".to_string(), ".md".to_string()]);
    }

    #[test]
    fn suffix_without_dot_matches_plain_endings() {
        let filter = FilterSet::new(["txt"]);
        assert!(filter.matches("notes.txt"));
        assert!(filter.matches("notestxt"));
        assert!(!filter.matches("notes.tx"));
    }
}
