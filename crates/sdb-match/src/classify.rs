//! Barcode name classification.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::MatchError;

/// Project id at the start of a barcode name, e.g. `P1234`.
static PROJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(P[0-9]{3,})").unwrap());

/// Optional project number, sample number, optional well letter.
static SAMPLE_PARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+_)?(\d+)_?([A-Z])?_").unwrap());

static INDEX_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(_index[0-9]+)").unwrap());

static BASE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());

/// Parts extracted from a barcode name without a project id prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnprefixedParts {
    /// Project number with its trailing underscore, e.g. `1234_`.
    pub project_fragment: Option<String>,
    pub sample_number: String,
    pub well: Option<char>,
    /// The name with its `_indexNN` suffix removed, when it has one.
    pub index_base: Option<String>,
}

impl UnprefixedParts {
    /// The canonical name implied by the project fragment: `P{project}_{sample}`.
    pub fn project_sample_name(&self) -> String {
        let project = self
            .project_fragment
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('_');
        format!("P{project}_{}", self.sample_number)
    }
}

/// The layout a barcode name follows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarcodeForm {
    /// Starts with a project id, e.g. `P1234_101B_index3`.
    Prefixed {
        /// Text before the first `_`.
        project_id: String,
        /// The name with the leading `{project_id}_` removed.
        remainder: String,
    },
    /// No project id prefix, e.g. `1234_101B_index3`.
    Unprefixed(UnprefixedParts),
}

/// Returns `true` if the barcode name starts with a project id.
pub fn is_prefixed(barcode: &str) -> bool {
    PROJECT_ID_RE.is_match(barcode)
}

/// The project id prefix of a barcode name, if any.
pub fn project_id_of(barcode: &str) -> Option<&str> {
    PROJECT_ID_RE
        .captures(barcode)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Split a barcode name into the parts the matching rules look at.
///
/// Fails with [`MatchError::PatternExtraction`] when an unprefixed name has
/// no recognisable sample number.
pub fn classify(barcode: &str) -> Result<BarcodeForm, MatchError> {
    if is_prefixed(barcode) {
        let project_id = barcode.split('_').next().unwrap_or(barcode).to_string();
        let remainder = barcode
            .strip_prefix(&format!("{project_id}_"))
            .unwrap_or(barcode)
            .to_string();
        return Ok(BarcodeForm::Prefixed {
            project_id,
            remainder,
        });
    }

    let caps = SAMPLE_PARTS_RE
        .captures(barcode)
        .ok_or_else(|| MatchError::PatternExtraction {
            barcode: barcode.to_string(),
        })?;
    let project_fragment = caps.get(1).map(|m| m.as_str().to_string());
    let sample_number = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let well = caps.get(3).and_then(|m| m.as_str().chars().next());

    let index_base = INDEX_SUFFIX_RE.find(barcode).and_then(|index| {
        let stripped = barcode.replace(index.as_str(), "");
        BASE_ID_RE.find(&stripped).map(|m| m.as_str().to_string())
    });

    Ok(BarcodeForm::Unprefixed(UnprefixedParts {
        project_fragment,
        sample_number,
        well,
        index_base,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unprefixed(barcode: &str) -> UnprefixedParts {
        match classify(barcode).unwrap() {
            BarcodeForm::Unprefixed(parts) => parts,
            other => panic!("expected unprefixed, got {other:?}"),
        }
    }

    #[test]
    fn prefixed_barcode() {
        assert_eq!(
            classify("P1234_101B_index3").unwrap(),
            BarcodeForm::Prefixed {
                project_id: "P1234".into(),
                remainder: "101B_index3".into(),
            }
        );
        assert_eq!(project_id_of("P1234_101B_index3"), Some("P1234"));
    }

    #[test]
    fn short_project_number_is_not_a_prefix() {
        assert!(!is_prefixed("P12_101"));
        assert!(project_id_of("P12_101").is_none());
    }

    #[test]
    fn unprefixed_with_project_and_well() {
        let parts = unprefixed("1234_101B_index3");
        assert_eq!(parts.project_fragment.as_deref(), Some("1234_"));
        assert_eq!(parts.sample_number, "101");
        assert_eq!(parts.well, Some('B'));
        assert_eq!(parts.index_base.as_deref(), Some("1234_101B"));
        assert_eq!(parts.project_sample_name(), "P1234_101");
    }

    #[test]
    fn unprefixed_sample_only() {
        let parts = unprefixed("7_index12");
        assert_eq!(parts.project_fragment, None);
        assert_eq!(parts.sample_number, "7");
        assert_eq!(parts.index_base.as_deref(), Some("7"));
        assert_eq!(parts.project_sample_name(), "P_7");
    }

    #[test]
    fn customer_well_name_with_index() {
        let parts = unprefixed("11A7_index5");
        assert_eq!(parts.sample_number, "7");
        assert_eq!(parts.well, None);
        assert_eq!(parts.index_base.as_deref(), Some("11A7"));
    }

    #[test]
    fn unrecognisable_unprefixed_name_fails() {
        assert!(matches!(
            classify("lonely-sample"),
            Err(MatchError::PatternExtraction { barcode }) if barcode == "lonely-sample"
        ));
    }
}
