//! The rules attached to a cell or range.
use crate::instance::{Matcher, Replacer};
use crate::sheet::CellRange;

/// A correction tried when good data fails: if `matcher` matches, `replacer`
/// supplies the suggested value.
#[derive(Debug, Clone)]
pub struct Correction {
    pub matcher: Matcher,
    pub replacer: Replacer,
}

/// Good-data matchers and error-correction pairs, both in registration order.
#[derive(Debug, Clone, Default)]
pub struct CellRules {
    good_data: Vec<Matcher>,
    corrections: Vec<Correction>,
}

impl CellRules {
    pub fn new() -> Self { Self::default() }

    pub fn with_good_data(mut self, matcher: Matcher) -> Self {
        self.good_data.push(matcher);
        self
    }

    pub fn with_correction(mut self, matcher: Matcher, replacer: Replacer) -> Self {
        self.corrections.push(Correction { matcher, replacer });
        self
    }

    pub fn push_good_data(&mut self, matcher: Matcher) {
        self.good_data.push(matcher);
    }

    pub fn push_correction(&mut self, matcher: Matcher, replacer: Replacer) {
        self.corrections.push(Correction { matcher, replacer });
    }

    pub fn good_data(&self) -> &[Matcher] { &self.good_data }
    pub fn corrections(&self) -> &[Correction] { &self.corrections }

    pub fn is_empty(&self) -> bool {
        self.good_data.is_empty() && self.corrections.is_empty()
    }

    /// Every address any attached instance reads, without duplicates.
    pub fn references(&self) -> Vec<CellRange> {
        let found = self
            .good_data
            .iter()
            .flat_map(|m| m.references())
            .chain(self.corrections.iter().flat_map(|c| c.matcher.references().iter().chain(c.replacer.references())));

        let mut out: Vec<CellRange> = Vec::new();
        for range in found {
            if !out.contains(range) {
                out.push(range.clone());
            }
        }
        out
    }
}
