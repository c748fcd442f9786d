//! The matching rules, one type per heuristic.
//!
//! Each rule looks at a single (barcode, canonical name) pair and answers
//! yes or no. Rules apply to one barcode form only and ignore the other.

use sdb_types::ProjectSample;

use crate::classify::{BarcodeForm, UnprefixedParts};

/// Well letters tried when stripping a canonical name, in order.
const WELL_LETTERS: [char; 5] = ['F', 'B', 'C', 'D', 'E'];

/// How much a rule hit can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confidence {
    /// Accepted as is.
    Certain,
    /// Accepted only after confirmation.
    NeedsConfirmation,
}

/// One pair under test.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    pub barcode: &'a str,
    pub form: &'a BarcodeForm,
    pub sample_name: &'a str,
    pub sample: &'a ProjectSample,
}

impl<'a> Candidate<'a> {
    fn unprefixed(&self) -> Option<&'a UnprefixedParts> {
        match self.form {
            BarcodeForm::Unprefixed(parts) => Some(parts),
            BarcodeForm::Prefixed { .. } => None,
        }
    }

    fn index_base(&self) -> Option<&'a str> {
        self.unprefixed().and_then(|p| p.index_base.as_deref())
    }
}

/// A single matching heuristic.
pub trait MatchRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn confidence(&self) -> Confidence;

    fn matches(&self, candidate: &Candidate<'_>) -> bool;
}

/// `name`, then `name` with one trailing well letter removed for each of
/// `F B C D E` in turn.
fn well_letter_variants(name: &str) -> impl Iterator<Item = &str> {
    std::iter::once(name).chain(
        WELL_LETTERS
            .into_iter()
            .map(move |letter| name.strip_suffix(letter).unwrap_or(name)),
    )
}

fn starts_with_sample(text: &str, sample_name: &str) -> bool {
    well_letter_variants(sample_name).any(|variant| text.starts_with(variant))
}

// ---------------------------------------------------------------------------
// Prefixed barcodes
// ---------------------------------------------------------------------------

/// `P1234_101B_index3` starts with `P1234_101`, possibly after removing a
/// well letter from the canonical name.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectPrefix;

impl MatchRule for DirectPrefix {
    fn name(&self) -> &'static str {
        "direct_prefix"
    }

    fn confidence(&self) -> Confidence {
        Confidence::Certain
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        matches!(candidate.form, BarcodeForm::Prefixed { .. })
            && starts_with_sample(candidate.barcode, candidate.sample_name)
    }
}

/// `P1234_101B_index3` with `P1234_` removed starts with `101`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectStrippedPrefix;

impl MatchRule for ProjectStrippedPrefix {
    fn name(&self) -> &'static str {
        "project_stripped_prefix"
    }

    fn confidence(&self) -> Confidence {
        Confidence::Certain
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        match candidate.form {
            BarcodeForm::Prefixed { remainder, .. } => {
                starts_with_sample(remainder, candidate.sample_name)
            }
            BarcodeForm::Unprefixed(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Unprefixed barcodes
// ---------------------------------------------------------------------------

/// The bare sample number is the canonical name.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleNumber;

impl MatchRule for SampleNumber {
    fn name(&self) -> &'static str {
        "sample_number"
    }

    fn confidence(&self) -> Confidence {
        Confidence::NeedsConfirmation
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        candidate
            .unprefixed()
            .is_some_and(|parts| parts.sample_number == candidate.sample_name)
    }
}

/// `1234_101_` reads as `P1234_101`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectFragment;

impl MatchRule for ProjectFragment {
    fn name(&self) -> &'static str {
        "project_fragment"
    }

    fn confidence(&self) -> Confidence {
        Confidence::NeedsConfirmation
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        candidate
            .unprefixed()
            .is_some_and(|parts| parts.project_sample_name() == candidate.sample_name)
    }
}

/// The name without its `_indexNN` suffix is the canonical name.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexBase;

impl MatchRule for IndexBase {
    fn name(&self) -> &'static str {
        "index_base"
    }

    fn confidence(&self) -> Confidence {
        Confidence::NeedsConfirmation
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        candidate.index_base() == Some(candidate.sample_name)
    }
}

/// The name without its `_indexNN` suffix is the customer's name.
#[derive(Clone, Copy, Debug, Default)]
pub struct CustomerName;

impl MatchRule for CustomerName {
    fn name(&self) -> &'static str {
        "customer_name"
    }

    fn confidence(&self) -> Confidence {
        Confidence::NeedsConfirmation
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        match (candidate.index_base(), candidate.sample.customer_name.as_deref()) {
            (Some(base), Some(customer)) => base == customer,
            _ => false,
        }
    }
}

/// Customer well names carry zeros (`11A07`) that run names drop (`11A7`).
#[derive(Clone, Copy, Debug, Default)]
pub struct CustomerNameWithoutZeros;

impl MatchRule for CustomerNameWithoutZeros {
    fn name(&self) -> &'static str {
        "customer_name_without_zeros"
    }

    fn confidence(&self) -> Confidence {
        Confidence::NeedsConfirmation
    }

    fn matches(&self, candidate: &Candidate<'_>) -> bool {
        match (candidate.index_base(), candidate.sample.customer_name.as_deref()) {
            (Some(base), Some(customer)) => base == customer.replace('0', ""),
            _ => false,
        }
    }
}

/// The standard cascade.
pub fn default_rules() -> Vec<Box<dyn MatchRule>> {
    vec![
        Box::new(SampleNumber),
        Box::new(ProjectFragment),
        Box::new(IndexBase),
        Box::new(CustomerName),
        Box::new(CustomerNameWithoutZeros),
        Box::new(DirectPrefix),
        Box::new(ProjectStrippedPrefix),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn hits(barcode: &str, sample_name: &str, sample: &ProjectSample) -> Vec<&'static str> {
        let form = classify(barcode).unwrap();
        let candidate = Candidate {
            barcode,
            form: &form,
            sample_name,
            sample,
        };
        default_rules()
            .iter()
            .filter(|rule| rule.matches(&candidate))
            .map(|rule| rule.name())
            .collect()
    }

    #[test]
    fn well_letter_variants_in_order() {
        let variants: Vec<_> = well_letter_variants("P1_101C").collect();
        assert_eq!(
            variants,
            vec!["P1_101C", "P1_101C", "P1_101C", "P1_101", "P1_101C", "P1_101C"]
        );
    }

    #[test]
    fn direct_prefix_with_and_without_letter() {
        let sample = ProjectSample::default();
        assert_eq!(hits("P1234_101B_index3", "P1234_101", &sample), vec!["direct_prefix"]);
        assert_eq!(hits("P1234_101_index3", "P1234_101F", &sample), vec!["direct_prefix"]);
        assert!(hits("P1234_102_index3", "P1234_101", &sample).is_empty());
    }

    #[test]
    fn project_stripped_prefix() {
        let sample = ProjectSample::default();
        assert_eq!(hits("P1234_101B_index3", "101", &sample), vec!["project_stripped_prefix"]);
        assert_eq!(hits("P1234_101_index3", "101D", &sample), vec!["project_stripped_prefix"]);
    }

    #[test]
    fn unprefixed_rules() {
        let sample = ProjectSample::default();
        assert_eq!(hits("1234_101B_index3", "101", &sample), vec!["sample_number"]);
        assert_eq!(hits("1234_101B_index3", "P1234_101", &sample), vec!["project_fragment"]);
        assert_eq!(hits("1234_101B_index3", "1234_101B", &sample), vec!["index_base"]);
    }

    #[test]
    fn customer_name_rules() {
        let plain = ProjectSample::with_customer_name("11A7");
        assert_eq!(
            hits("11A7_index5", "P1234_1", &plain),
            vec!["customer_name", "customer_name_without_zeros"]
        );

        let padded = ProjectSample::with_customer_name("11A07");
        assert_eq!(
            hits("11A7_index5", "P1234_1", &padded),
            vec!["customer_name_without_zeros"]
        );

        assert!(hits("11A7_index5", "P1234_1", &ProjectSample::default()).is_empty());
    }

    #[test]
    fn prefixed_rules_ignore_unprefixed_forms() {
        let sample = ProjectSample::default();
        assert!(!hits("1234_101B_index3", "1234", &sample).contains(&"direct_prefix"));
    }

    #[test]
    fn confidence_levels() {
        for rule in default_rules() {
            let expected = match rule.name() {
                "direct_prefix" | "project_stripped_prefix" => Confidence::Certain,
                _ => Confidence::NeedsConfirmation,
            };
            assert_eq!(rule.confidence(), expected, "{}", rule.name());
        }
    }
}
