//! Category classification.
//!
//! A label is classified by finding every configured kind whose keyword
//! occurs in it (case-insensitive). Exactly one match classifies the row; no
//! match or several matches leave it unclassified. The result does not depend
//! on rule order.

use tally_core::types::TaskKind;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Classifier {
    /// `(kind, lowercase keyword)`.
    rules: Vec<(TaskKind, String)>,
}

impl Classifier {
    pub fn new<'a>(rules: impl IntoIterator<Item = (TaskKind, &'a str)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(kind, keyword)| (kind, keyword.trim().to_lowercase()))
                .filter(|(_, keyword)| !keyword.is_empty())
                .collect(),
        }
    }

    pub fn classify(&self, label: &str) -> Option<TaskKind> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }
        let mut matched = self
            .rules
            .iter()
            .filter(|(_, keyword)| label.contains(keyword.as_str()))
            .map(|(kind, _)| *kind);

        let first = matched.next()?;
        if let Some(second) = matched.next() {
            trace!(%label, %first, %second, "classify: ambiguous label");
            return None;
        }
        Some(first)
    }
}
