//! Text normalization used when matching labels against search terms.

/// Lowercases, collapses every whitespace run into a single space and trims.
pub fn normalize_label(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `label` contains `term` once both are normalized.
pub fn label_contains(label: &str, term: &str) -> bool {
    normalize_label(label).contains(&normalize_label(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_case() {
        assert_eq!(normalize_label("  Part\t  NUMBER \n"), "part number");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn matching_ignores_case_and_whitespace_runs() {
        let term = "part number";
        for label in ["Part Number", "PART   NUMBER", "part\nnumber", " Part \t Number (supplier) "] {
            assert!(label_contains(label, term), "{label}");
        }
        assert!(!label_contains("Partnumber", term));
        assert!(label_contains("Dual Use Item - Control list", "Dual Use Item  - Control list"));
    }
}
