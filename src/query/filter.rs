use crate::index::corpus::CorpusSnapshot;
use crate::types::{FacetKey, Field, FieldKind, FilterSelection, Item, RangeSelection};
use std::collections::HashSet;

/// One facet's constraint after compilation against a corpus.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Item value must be one of these keys.
    OneOf(HashSet<FacetKey>),
    /// Item value must lie in the inclusive range.
    Between(RangeSelection),
}

impl Constraint {
    pub fn accepts(&self, field: Field, item: &Item) -> bool {
        match self {
            Constraint::OneOf(keys) => item
                .key(field)
                .map_or(false, |k| keys.iter().any(|want| k.matches(want))),
            Constraint::Between(range) => item.number(field).map_or(false, |v| range.contains(v)),
        }
    }
}

/// Compiles a [`FilterSelection`] against one corpus snapshot.
///
/// Compilation drops what cannot constrain anything: selected codes no item
/// carries, and selections on fields the corpus does not provide. A field
/// whose every selected code is unknown ends up unconstrained.
pub struct FilterCompiler<'a> {
    corpus: &'a CorpusSnapshot,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(corpus: &'a CorpusSnapshot) -> Self {
        FilterCompiler { corpus }
    }

    pub fn compile(&self, selection: &FilterSelection) -> CompiledFilter {
        let mut constraints = Vec::new();

        for field in Field::ALL {
            if !selection.is_constrained(field) {
                continue;
            }
            if !self.corpus.provides(field) {
                tracing::debug!("[FILTER] skip {}: field not provided by corpus", field);
                continue;
            }

            match field.kind() {
                FieldKind::Code | FieldKind::Number => {
                    let Some(selected) = selection.values(field) else {
                        continue;
                    };
                    let known: HashSet<FacetKey> = selected
                        .iter()
                        .filter(|k| self.corpus.knows(field, k))
                        .cloned()
                        .collect();
                    if known.len() < selected.len() {
                        tracing::debug!(
                            "[FILTER] {}: dropped {} unknown value(s)",
                            field,
                            selected.len() - known.len()
                        );
                    }
                    if !known.is_empty() {
                        constraints.push((field, Constraint::OneOf(known)));
                    }
                }
                FieldKind::Range => {
                    if let Some(range) = selection.range(field) {
                        constraints.push((field, Constraint::Between(*range)));
                    }
                }
            }
        }

        CompiledFilter { constraints }
    }
}

/// Compiled constraints, evaluated as a per-item mismatch bitmask.
///
/// Bit `f.bit()` is set when the item fails field `f`'s constraint, so
/// "every filter except F" is `mask & !F.bit() == 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    constraints: Vec<(Field, Constraint)>,
}

impl CompiledFilter {
    pub fn constrains(&self, field: Field) -> bool {
        self.constraints.iter().any(|(f, _)| *f == field)
    }

    pub fn constraint(&self, field: Field) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    /// Fields that survived compilation.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.constraints.iter().map(|(f, _)| *f)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn mismatch_mask(&self, item: &Item) -> u16 {
        self.constraints
            .iter()
            .filter(|(field, c)| !c.accepts(*field, item))
            .fold(0u16, |mask, (field, _)| mask | field.bit())
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.mismatch_mask(item) == 0
    }

    /// Applies every constraint except `field`'s own.
    pub fn matches_except(&self, item: &Item, field: Field) -> bool {
        self.mismatch_mask(item) & !field.bit() == 0
    }

    /// One pass over `items`, recording every item's mismatch mask.
    pub fn evaluate(&self, items: &[Item]) -> MatchMasks {
        MatchMasks {
            masks: items.iter().map(|item| self.mismatch_mask(item)).collect(),
        }
    }
}

/// Mismatch masks for a whole corpus, parallel to its item slice.
#[derive(Debug, Clone, Default)]
pub struct MatchMasks {
    masks: Vec<u16>,
}

impl MatchMasks {
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Indices of items passing every filter except `field`'s.
    pub fn excluding(&self, field: Field) -> impl Iterator<Item = usize> + '_ {
        let ignore = !field.bit();
        self.masks
            .iter()
            .enumerate()
            .filter(move |(_, m)| **m & ignore == 0)
            .map(|(i, _)| i)
    }

    /// Indices of items passing every filter.
    pub fn matching(&self) -> impl Iterator<Item = usize> + '_ {
        self.masks
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == 0)
            .map(|(i, _)| i)
    }
}
