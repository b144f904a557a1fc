use carfacets::{Field, FilterSelection};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// POST body for `/1/facets`, carrying the same string the GET form puts in
/// its query.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FacetParamsBody {
    #[serde(default)]
    pub params: String,
}

/// Returned after a corpus upload or on `GET /1/corpus`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    pub items: usize,
    pub fields: Vec<String>,
}

/// Returned after a catalog upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub labels: usize,
}

/// Which side of a range a query key sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSide {
    Min,
    Max,
}

fn categorical_param(key: &str) -> Option<Field> {
    match key {
        "makeCodes" => Some(Field::Make),
        "modelCodes" => Some(Field::Model),
        "transmissionTypeCodes" => Some(Field::Transmission),
        "bodyTypeCodes" => Some(Field::Body),
        "fuelTypeCodes" => Some(Field::Fuel),
        "seats" => Some(Field::Seats),
        "doors" => Some(Field::Doors),
        _ => None,
    }
}

fn range_param(key: &str) -> Option<(Field, RangeSide)> {
    match key {
        "priceMin" => Some((Field::Price, RangeSide::Min)),
        "priceMax" => Some((Field::Price, RangeSide::Max)),
        "mileageMin" => Some((Field::Mileage, RangeSide::Min)),
        "mileageMax" => Some((Field::Mileage, RangeSide::Max)),
        "yearMin" => Some((Field::Year, RangeSide::Min)),
        "yearMax" => Some((Field::Year, RangeSide::Max)),
        _ => None,
    }
}

/// Builds a selection from a url-encoded parameter string.
///
/// List parameters accept comma-separated values and may repeat; repeats are
/// merged. Unknown keys, empty values and unparseable numbers are ignored, so
/// a malformed query narrows nothing rather than failing the request.
pub fn parse_facet_params(params: &str) -> FilterSelection {
    let mut selection = FilterSelection::new();
    let params = params.strip_prefix('?').unwrap_or(params);

    for (key, value) in url::form_urlencoded::parse(params.as_bytes()) {
        if let Some(field) = categorical_param(&key) {
            for raw in value.split(',') {
                if !selection.push_raw(field, raw) && !raw.trim().is_empty() {
                    tracing::debug!("[PARAMS] ignoring {}={:?}", key, raw);
                }
            }
            continue;
        }

        if let Some((field, side)) = range_param(&key) {
            let Ok(number) = value.trim().parse::<f64>() else {
                tracing::debug!("[PARAMS] ignoring {}={:?}", key, value);
                continue;
            };
            if !number.is_finite() {
                continue;
            }
            match side {
                RangeSide::Min => selection.set_min(field, Some(number)),
                RangeSide::Max => selection.set_max(field, Some(number)),
            }
        }
    }

    selection
}
