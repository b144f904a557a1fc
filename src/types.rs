use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Item fields the engine can facet on.
///
/// Each field has a fixed [`FieldKind`] and a fixed key in
/// [`FacetCountsResponse`]. The serialized name matches the item attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "makeCode")]
    Make,
    #[serde(rename = "modelCode")]
    Model,
    #[serde(rename = "transmissionTypeCode")]
    Transmission,
    #[serde(rename = "bodyTypeCode")]
    Body,
    #[serde(rename = "fuelTypeCode")]
    Fuel,
    #[serde(rename = "seats")]
    Seats,
    #[serde(rename = "doors")]
    Doors,
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "modelYear")]
    Year,
    #[serde(rename = "mileage")]
    Mileage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text code compared after normalization.
    Code,
    /// Small integer compared by exact match (seats, doors).
    Number,
    /// Continuous value constrained by `{min, max}`.
    Range,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Make,
        Field::Model,
        Field::Transmission,
        Field::Body,
        Field::Fuel,
        Field::Seats,
        Field::Doors,
        Field::Price,
        Field::Year,
        Field::Mileage,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Make | Field::Model | Field::Transmission | Field::Body | Field::Fuel => {
                FieldKind::Code
            }
            Field::Seats | Field::Doors => FieldKind::Number,
            Field::Price | Field::Year | Field::Mileage => FieldKind::Range,
        }
    }

    pub fn is_categorical(self) -> bool {
        !matches!(self.kind(), FieldKind::Range)
    }

    /// Attribute name on the item, as in the JSON corpus.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Make => "makeCode",
            Field::Model => "modelCode",
            Field::Transmission => "transmissionTypeCode",
            Field::Body => "bodyTypeCode",
            Field::Fuel => "fuelTypeCode",
            Field::Seats => "seats",
            Field::Doors => "doors",
            Field::Price => "price",
            Field::Year => "modelYear",
            Field::Mileage => "mileage",
        }
    }

    /// Key of this facet's count map in the response.
    pub fn response_key(self) -> &'static str {
        match self {
            Field::Make => "makes",
            Field::Model => "models",
            Field::Transmission => "transmissions",
            Field::Body => "bodies",
            Field::Fuel => "fuels",
            Field::Seats => "seats",
            Field::Doors => "doors",
            Field::Price => "prices",
            Field::Year => "years",
            Field::Mileage => "mileages",
        }
    }

    /// Bit used in per-item mismatch masks.
    pub fn bit(self) -> u16 {
        1u16 << (self as u16)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a categorical facet: a normalized code or a small integer.
///
/// Serializes as a bare string or integer so it can key a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetKey {
    Code(String),
    Number(i64),
}

impl FacetKey {
    /// Builds a code key, trimmed and upper-cased.
    pub fn code(raw: &str) -> Self {
        FacetKey::Code(normalize_code(raw))
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            FacetKey::Code(c) => Some(c),
            FacetKey::Number(_) => None,
        }
    }
}

impl From<&str> for FacetKey {
    fn from(raw: &str) -> Self {
        FacetKey::code(raw)
    }
}

impl From<i64> for FacetKey {
    fn from(n: i64) -> Self {
        FacetKey::Number(n)
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetKey::Code(c) => f.write_str(c),
            FacetKey::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for FacetKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FacetKey::Code(c) => serializer.serialize_str(c),
            FacetKey::Number(n) => serializer.serialize_i64(*n),
        }
    }
}

/// Borrowed form of [`FacetKey`] used while counting, so the hot loop does
/// not allocate per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetKeyRef<'a> {
    Code(&'a str),
    Number(i64),
}

impl FacetKeyRef<'_> {
    pub fn to_owned_key(self) -> FacetKey {
        match self {
            FacetKeyRef::Code(c) => FacetKey::Code(c.to_string()),
            FacetKeyRef::Number(n) => FacetKey::Number(n),
        }
    }

    pub fn matches(self, key: &FacetKey) -> bool {
        match (self, key) {
            (FacetKeyRef::Code(a), FacetKey::Code(b)) => a == b,
            (FacetKeyRef::Number(a), FacetKey::Number(b)) => a == *b,
            _ => false,
        }
    }
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| normalize_code(&s)).filter(|s| !s.is_empty()))
}

/// One searchable listing.
///
/// Owned by the corpus provider; the engine only reads it. Codes are
/// normalized on deserialization and by [`Item::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, alias = "objectID")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub make_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub model_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub transmission_type_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub body_type_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub fuel_type_code: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub mileage: Option<f64>,
    #[serde(default)]
    pub model_year: Option<i32>,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub doors: Option<u32>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Item {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_make(mut self, code: &str) -> Self {
        self.make_code = Some(code.to_string());
        self
    }

    pub fn with_model(mut self, code: &str) -> Self {
        self.model_code = Some(code.to_string());
        self
    }

    pub fn with_transmission(mut self, code: &str) -> Self {
        self.transmission_type_code = Some(code.to_string());
        self
    }

    pub fn with_body(mut self, code: &str) -> Self {
        self.body_type_code = Some(code.to_string());
        self
    }

    pub fn with_fuel(mut self, code: &str) -> Self {
        self.fuel_type_code = Some(code.to_string());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_mileage(mut self, mileage: f64) -> Self {
        self.mileage = Some(mileage);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.model_year = Some(year);
        self
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats = Some(seats);
        self
    }

    pub fn with_doors(mut self, doors: u32) -> Self {
        self.doors = Some(doors);
        self
    }

    /// Trims and upper-cases every code; empty codes become `None`.
    pub fn normalized(mut self) -> Self {
        for code in [
            &mut self.make_code,
            &mut self.model_code,
            &mut self.transmission_type_code,
            &mut self.body_type_code,
            &mut self.fuel_type_code,
        ] {
            *code = code
                .take()
                .map(|c| normalize_code(&c))
                .filter(|c| !c.is_empty());
        }
        self
    }

    /// Categorical value of `field`, or `None` for range fields and missing values.
    pub fn key(&self, field: Field) -> Option<FacetKeyRef<'_>> {
        let code = match field {
            Field::Make => &self.make_code,
            Field::Model => &self.model_code,
            Field::Transmission => &self.transmission_type_code,
            Field::Body => &self.body_type_code,
            Field::Fuel => &self.fuel_type_code,
            Field::Seats => return self.seats.map(|n| FacetKeyRef::Number(n as i64)),
            Field::Doors => return self.doors.map(|n| FacetKeyRef::Number(n as i64)),
            Field::Price | Field::Year | Field::Mileage => return None,
        };
        code.as_deref().map(FacetKeyRef::Code)
    }

    /// Numeric value of a range field. Non-finite values read as missing.
    pub fn number(&self, field: Field) -> Option<f64> {
        let value = match field {
            Field::Price => self.price,
            Field::Mileage => self.mileage,
            Field::Year => self.model_year.map(f64::from),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }
}

/// Inclusive `{min, max}` constraint. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeSelection {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeSelection {
    /// Non-finite bounds degrade to unbounded.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        RangeSelection {
            min: min.filter(|v| v.is_finite()),
            max: max.filter(|v| v.is_finite()),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// The caller's active selections, treated as an immutable snapshot per call.
///
/// Absent or empty entries mean "no constraint for this facet".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    values: BTreeMap<Field, BTreeSet<FacetKey>>,
    ranges: BTreeMap<Field, RangeSelection>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds accepted codes for a code field. Ignored for other field kinds.
    pub fn with_codes<I, S>(mut self, field: Field, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for code in codes {
            self.push_raw(field, code.as_ref());
        }
        self
    }

    /// Adds accepted integers for seats/doors. Ignored for other field kinds.
    pub fn with_numbers<I>(mut self, field: Field, numbers: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        if field.kind() == FieldKind::Number {
            self.values
                .entry(field)
                .or_default()
                .extend(numbers.into_iter().map(FacetKey::Number));
        }
        self
    }

    pub fn with_range(mut self, field: Field, min: Option<f64>, max: Option<f64>) -> Self {
        self.set_range(field, RangeSelection::new(min, max));
        self
    }

    /// Adds one raw categorical value as it arrives from a query string.
    ///
    /// Returns `false` when the value was dropped: empty, unparseable for an
    /// integer field, or targeting a range field.
    pub fn push_raw(&mut self, field: Field, raw: &str) -> bool {
        let key = match field.kind() {
            FieldKind::Code => {
                let code = normalize_code(raw);
                if code.is_empty() {
                    return false;
                }
                FacetKey::Code(code)
            }
            FieldKind::Number => match raw.trim().parse::<i64>() {
                Ok(n) => FacetKey::Number(n),
                Err(_) => return false,
            },
            FieldKind::Range => return false,
        };
        self.values.entry(field).or_default().insert(key);
        true
    }

    pub fn set_range(&mut self, field: Field, range: RangeSelection) {
        if field.kind() != FieldKind::Range {
            return;
        }
        if range.is_unbounded() {
            self.ranges.remove(&field);
        } else {
            self.ranges.insert(field, range);
        }
    }

    pub fn set_min(&mut self, field: Field, min: Option<f64>) {
        let max = self.range(field).and_then(|r| r.max);
        self.set_range(field, RangeSelection::new(min, max));
    }

    pub fn set_max(&mut self, field: Field, max: Option<f64>) {
        let min = self.range(field).and_then(|r| r.min);
        self.set_range(field, RangeSelection::new(min, max));
    }

    /// Selected categorical values; `None` when the facet is unconstrained.
    pub fn values(&self, field: Field) -> Option<&BTreeSet<FacetKey>> {
        self.values.get(&field).filter(|v| !v.is_empty())
    }

    pub fn range(&self, field: Field) -> Option<&RangeSelection> {
        self.ranges.get(&field).filter(|r| !r.is_unbounded())
    }

    pub fn is_constrained(&self, field: Field) -> bool {
        self.values(field).is_some() || self.range(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| !self.is_constrained(*f))
    }
}

/// One bound of a range option: an explicit value or "Any".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum RangeBound {
    Unbounded,
    Bound(i64),
}

impl RangeBound {
    pub fn value(self) -> Option<i64> {
        match self {
            RangeBound::Unbounded => None,
            RangeBound::Bound(v) => Some(v),
        }
    }
}

/// `(bucketStart, count)` for a range facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount {
    pub bucket_start: i64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeOption {
    pub bound: RangeBound,
    pub count: u64,
}

/// "From" and "To" option lists for one range facet. "Any" comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeOptions {
    pub from: Vec<RangeOption>,
    pub to: Vec<RangeOption>,
}

impl RangeOptions {
    pub fn from_count(&self, bound: RangeBound) -> Option<u64> {
        self.from.iter().find(|o| o.bound == bound).map(|o| o.count)
    }

    pub fn to_count(&self, bound: RangeBound) -> Option<u64> {
        self.to.iter().find(|o| o.bound == bound).map(|o| o.count)
    }
}

pub type CategoricalCounts = IndexMap<FacetKey, u64>;
pub type BucketCounts = IndexMap<i64, u64>;
pub type LabelMap = IndexMap<String, String>;

/// Facet counts for one request: the only contract with the UI.
///
/// A facet whose field is not provided by the corpus is `None` and its key is
/// absent from the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCountsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub makes: Option<CategoricalCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<CategoricalCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmissions: Option<CategoricalCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bodies: Option<CategoricalCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuels: Option<CategoricalCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<CategoricalCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<CategoricalCounts>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<BucketCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<BucketCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileages: Option<BucketCounts>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_options: Option<RangeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_options: Option<RangeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage_options: Option<RangeOptions>,

    pub price_step: i64,
    pub mileage_step: i64,
    pub min_mileage: i64,
    pub mileage_exact: BucketCounts,

    pub make_labels: LabelMap,
    pub model_labels: LabelMap,
    pub model_make_codes: LabelMap,
    pub transmission_labels: LabelMap,
    pub body_labels: LabelMap,
    pub fuel_labels: LabelMap,
}

impl FacetCountsResponse {
    pub fn categorical(&self, field: Field) -> Option<&CategoricalCounts> {
        match field {
            Field::Make => self.makes.as_ref(),
            Field::Model => self.models.as_ref(),
            Field::Transmission => self.transmissions.as_ref(),
            Field::Body => self.bodies.as_ref(),
            Field::Fuel => self.fuels.as_ref(),
            Field::Seats => self.seats.as_ref(),
            Field::Doors => self.doors.as_ref(),
            Field::Price | Field::Year | Field::Mileage => None,
        }
    }

    pub(crate) fn categorical_slot(&mut self, field: Field) -> Option<&mut Option<CategoricalCounts>> {
        match field {
            Field::Make => Some(&mut self.makes),
            Field::Model => Some(&mut self.models),
            Field::Transmission => Some(&mut self.transmissions),
            Field::Body => Some(&mut self.bodies),
            Field::Fuel => Some(&mut self.fuels),
            Field::Seats => Some(&mut self.seats),
            Field::Doors => Some(&mut self.doors),
            Field::Price | Field::Year | Field::Mileage => None,
        }
    }

    pub fn buckets(&self, field: Field) -> Option<&BucketCounts> {
        match field {
            Field::Price => self.prices.as_ref(),
            Field::Year => self.years.as_ref(),
            Field::Mileage => self.mileages.as_ref(),
            _ => None,
        }
    }

    /// Range buckets as ascending `(bucketStart, count)` pairs; empty if omitted.
    pub fn bucket_list(&self, field: Field) -> Vec<BucketCount> {
        self.buckets(field)
            .map(|b| {
                b.iter()
                    .map(|(start, count)| BucketCount {
                        bucket_start: *start,
                        count: *count,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn range_options(&self, field: Field) -> Option<&RangeOptions> {
        match field {
            Field::Price => self.price_options.as_ref(),
            Field::Year => self.year_options.as_ref(),
            Field::Mileage => self.mileage_options.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn range_slots(
        &mut self,
        field: Field,
    ) -> Option<(&mut Option<BucketCounts>, &mut Option<RangeOptions>)> {
        match field {
            Field::Price => Some((&mut self.prices, &mut self.price_options)),
            Field::Year => Some((&mut self.years, &mut self.year_options)),
            Field::Mileage => Some((&mut self.mileages, &mut self.mileage_options)),
            _ => None,
        }
    }

    /// Label map for a code field; seats, doors and range fields have none.
    pub fn labels(&self, field: Field) -> Option<&LabelMap> {
        match field {
            Field::Make => Some(&self.make_labels),
            Field::Model => Some(&self.model_labels),
            Field::Transmission => Some(&self.transmission_labels),
            Field::Body => Some(&self.body_labels),
            Field::Fuel => Some(&self.fuel_labels),
            _ => None,
        }
    }

    pub(crate) fn labels_mut(&mut self, field: Field) -> Option<&mut LabelMap> {
        match field {
            Field::Make => Some(&mut self.make_labels),
            Field::Model => Some(&mut self.model_labels),
            Field::Transmission => Some(&mut self.transmission_labels),
            Field::Body => Some(&mut self.body_labels),
            Field::Fuel => Some(&mut self.fuel_labels),
            _ => None,
        }
    }
}
