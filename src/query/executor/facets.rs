use super::FacetExecutor;
use crate::catalog::LabelSource;
use crate::query::filter::{CompiledFilter, Constraint, MatchMasks};
use crate::types::{
    CategoricalCounts, FacetCountsResponse, FacetKey, FacetKeyRef, Field, FieldKind,
    FilterSelection, Item, LabelMap,
};
use std::collections::HashMap;

impl FacetExecutor {
    /// Counts values of `field` over the items passing every filter except
    /// `field`'s own. Only present values are emitted; order is count
    /// descending, then key ascending.
    pub(crate) fn count_categorical(
        &self,
        items: &[Item],
        masks: &MatchMasks,
        field: Field,
    ) -> CategoricalCounts {
        let mut counts: HashMap<FacetKeyRef<'_>, u64> = HashMap::new();
        for i in masks.excluding(field) {
            if let Some(key) = items[i].key(field) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<(FacetKeyRef<'_>, u64)> = counts.into_iter().collect();
        entries.sort_unstable_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));

        tracing::debug!("[FACET_COUNT] {} distinct={}", field, entries.len());
        entries
            .into_iter()
            .map(|(k, c)| (k.to_owned_key(), c))
            .collect()
    }

    /// Drops models that belong to an unselected make from the offered list.
    ///
    /// Counting is untouched: the remaining model counts are exactly what
    /// "every filter except model" produced.
    pub(crate) fn apply_model_display_filter(
        &self,
        filter: &CompiledFilter,
        labels: &dyn LabelSource,
        response: &mut FacetCountsResponse,
    ) {
        let Some(Constraint::OneOf(makes)) = filter.constraint(Field::Make) else {
            return;
        };
        let Some(models) = response.models.as_mut() else {
            return;
        };

        let before = models.len();
        models.retain(|model, _| offered_model(labels, makes, model));
        if models.len() != before {
            tracing::debug!(
                "[FACET_MODELS] hid {} model(s) outside selected makes",
                before - models.len()
            );
        }
    }

    /// Fills the label maps from the catalog. Covers every code in the
    /// counts plus every selected code; codes without a catalog name get no
    /// entry.
    pub(crate) fn attach_labels(
        &self,
        filter: &CompiledFilter,
        labels: &dyn LabelSource,
        selection: &FilterSelection,
        response: &mut FacetCountsResponse,
    ) {
        let selected_makes = match filter.constraint(Field::Make) {
            Some(Constraint::OneOf(makes)) => Some(makes.clone()),
            _ => None,
        };

        for field in Field::ALL.into_iter().filter(|f| f.kind() == FieldKind::Code) {
            let mut codes: Vec<String> = response
                .categorical(field)
                .map(|counts| counts.keys().filter_map(|k| k.as_code().map(str::to_string)).collect())
                .unwrap_or_default();
            if let Some(selected) = selection.values(field) {
                codes.extend(selected.iter().filter_map(|k| k.as_code().map(str::to_string)));
            }

            let mut map = LabelMap::new();
            let mut owners = LabelMap::new();
            for code in codes {
                if map.contains_key(&code) {
                    continue;
                }
                if field == Field::Model {
                    if let Some(makes) = &selected_makes {
                        let key = FacetKey::Code(code.clone());
                        if !offered_model(labels, makes, &key) {
                            continue;
                        }
                    }
                    if let Some(make) = labels.make_of_model(&code) {
                        owners.insert(code.clone(), make.to_string());
                    }
                }
                if let Some(name) = labels.label(field, &code) {
                    map.insert(code, name.to_string());
                }
            }

            if field == Field::Model {
                response.model_make_codes = owners;
            }
            if let Some(slot) = response.labels_mut(field) {
                *slot = map;
            }
        }
    }
}

fn offered_model(
    labels: &dyn LabelSource,
    makes: &std::collections::HashSet<FacetKey>,
    model: &FacetKey,
) -> bool {
    let Some(code) = model.as_code() else {
        return true;
    };
    match labels.make_of_model(code) {
        Some(make) => makes.iter().any(|m| m.as_code() == Some(make)),
        None => true,
    }
}
