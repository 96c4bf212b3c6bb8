use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::LoadError;
use super::stats::Kpis;

// ---------------------------------------------------------------------------
// Churn – the binary outcome
// ---------------------------------------------------------------------------

/// Whether a customer discontinued service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Churn {
    No,
    Yes,
}

impl Churn {
    /// Draw order used by every chart: retained customers first.
    pub const ALL: [Churn; 2] = [Churn::No, Churn::Yes];

    pub fn as_str(self) -> &'static str {
        match self {
            Churn::No => "No",
            Churn::Yes => "Yes",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Churn::Yes
    }
}

impl fmt::Display for Churn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Churn {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Yes" | "yes" | "1" | "true" | "True" => Ok(Churn::Yes),
            "No" | "no" | "0" | "false" | "False" => Ok(Churn::No),
            other => Err(LoadError::InvalidChurn(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Column identifiers
// ---------------------------------------------------------------------------

/// Categorical columns of the churn dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Contract,
    PaymentMethod,
    InternetService,
    OnlineSecurity,
    TechSupport,
    StreamingTV,
    Gender,
    SeniorCitizen,
    Partner,
    Dependents,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Contract,
        Category::PaymentMethod,
        Category::InternetService,
        Category::OnlineSecurity,
        Category::TechSupport,
        Category::StreamingTV,
        Category::Gender,
        Category::SeniorCitizen,
        Category::Partner,
        Category::Dependents,
    ];

    /// Header name as it appears in the source file.
    pub fn column_name(self) -> &'static str {
        match self {
            Category::Contract => "Contract",
            Category::PaymentMethod => "PaymentMethod",
            Category::InternetService => "InternetService",
            Category::OnlineSecurity => "OnlineSecurity",
            Category::TechSupport => "TechSupport",
            Category::StreamingTV => "StreamingTV",
            Category::Gender => "Gender",
            Category::SeniorCitizen => "SeniorCitizen",
            Category::Partner => "Partner",
            Category::Dependents => "Dependents",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Numeric columns of the churn dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Measure {
    Tenure,
    MonthlyCharges,
    TotalCharges,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Tenure, Measure::MonthlyCharges, Measure::TotalCharges];

    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Tenure => "Tenure",
            Measure::MonthlyCharges => "MonthlyCharges",
            Measure::TotalCharges => "TotalCharges",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Every column a source file must provide.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    Category::ALL
        .into_iter()
        .map(Category::column_name)
        .chain(Measure::ALL.into_iter().map(Measure::column_name))
        .chain(std::iter::once("Churn"))
}

// ---------------------------------------------------------------------------
// CustomerRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single customer (one row of the source table).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    #[serde(deserialize_with = "label")]
    pub contract: String,
    #[serde(deserialize_with = "label")]
    pub payment_method: String,
    #[serde(deserialize_with = "label")]
    pub internet_service: String,
    #[serde(deserialize_with = "label")]
    pub online_security: String,
    #[serde(deserialize_with = "label")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV", deserialize_with = "label")]
    pub streaming_tv: String,
    #[serde(deserialize_with = "label")]
    pub gender: String,
    #[serde(deserialize_with = "label")]
    pub senior_citizen: String,
    #[serde(deserialize_with = "label")]
    pub partner: String,
    #[serde(deserialize_with = "label")]
    pub dependents: String,
    /// Months of service.
    pub tenure: f64,
    pub monthly_charges: f64,
    /// Blank for brand-new customers in most exports.
    #[serde(default, deserialize_with = "optional_number")]
    pub total_charges: Option<f64>,
    #[serde(deserialize_with = "churn_label")]
    pub churn: Churn,
}

impl CustomerRecord {
    /// Categorical value of `column` for this customer.
    pub fn category(&self, column: Category) -> &str {
        match column {
            Category::Contract => &self.contract,
            Category::PaymentMethod => &self.payment_method,
            Category::InternetService => &self.internet_service,
            Category::OnlineSecurity => &self.online_security,
            Category::TechSupport => &self.tech_support,
            Category::StreamingTV => &self.streaming_tv,
            Category::Gender => &self.gender,
            Category::SeniorCitizen => &self.senior_citizen,
            Category::Partner => &self.partner,
            Category::Dependents => &self.dependents,
        }
    }

    /// Numeric value of `column`; `None` when the cell was blank.
    pub fn measure(&self, column: Measure) -> Option<f64> {
        match column {
            Measure::Tenure => Some(self.tenure),
            Measure::MonthlyCharges => Some(self.monthly_charges),
            Measure::TotalCharges => self.total_charges,
        }
    }
}

// -- Lenient cell decoding shared by the CSV and JSON loaders --

/// Any scalar a categorical cell may hold.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn into_label(self) -> String {
        match self {
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => normalize_label(&s),
        }
    }
}

/// Canonical text for a categorical cell, whatever format it came from.
///
/// The CSV reader types `1.0` as a float before we see it, so numeric text
/// is rendered the same way everywhere: `1.0` and `1` both become `"1"`,
/// `1e3` becomes `"1000"`.
pub(crate) fn normalize_label(text: &str) -> String {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return i.to_string();
    }
    match text.parse::<f64>() {
        Ok(f) => f.to_string(),
        Err(_) => text.to_string(),
    }
}

fn label<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Cell::deserialize(de).map(Cell::into_label)
}

fn churn_label<'de, D: Deserializer<'de>>(de: D) -> Result<Churn, D::Error> {
    let text = label(de)?;
    text.parse().map_err(serde::de::Error::custom)
}

fn optional_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    match Option::<Cell>::deserialize(de)? {
        None => Ok(None),
        Some(Cell::Int(i)) => Ok(Some(i as f64)),
        Some(Cell::Float(f)) => Ok(Some(f)),
        Some(Cell::Bool(b)) => Err(serde::de::Error::custom(format!(
            "expected a number, got {b}"
        ))),
        Some(Cell::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a number")))
        }
    }
}

// ---------------------------------------------------------------------------
// ChurnDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct ChurnDataset {
    records: Vec<CustomerRecord>,
    /// Distinct Contract values in first-appearance order.
    contracts: Vec<String>,
    /// KPIs over every record.
    summary: Kpis,
}

impl ChurnDataset {
    /// Build the contract index and global summary from loaded records.
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        let contracts = distinct_in_order(&records, Category::Contract);
        let summary = Kpis::compute(&View::all(&records));
        ChurnDataset {
            records,
            contracts,
            summary,
        }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn contracts(&self) -> &[String] {
        &self.contracts
    }

    pub fn summary(&self) -> &Kpis {
        &self.summary
    }

    /// Borrow the rows at `indices` as a view.
    pub fn view(&self, indices: &[usize]) -> View<'_> {
        View {
            records: indices.iter().filter_map(|&i| self.records.get(i)).collect(),
        }
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn distinct_in_order(records: &[CustomerRecord], column: Category) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(|r| r.category(column))
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// View – a borrowed row subset
// ---------------------------------------------------------------------------

/// A row subset of a [`ChurnDataset`], in dataset order.
#[derive(Debug, Clone, Default)]
pub struct View<'a> {
    records: Vec<&'a CustomerRecord>,
}

impl<'a> View<'a> {
    pub fn all(records: &'a [CustomerRecord]) -> Self {
        View {
            records: records.iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CustomerRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn customer(contract: &str, tenure: f64, monthly: f64, churn: Churn) -> CustomerRecord {
        CustomerRecord {
            contract: contract.to_string(),
            payment_method: "Electronic check".to_string(),
            internet_service: "Fiber optic".to_string(),
            online_security: "No".to_string(),
            tech_support: "No".to_string(),
            streaming_tv: "Yes".to_string(),
            gender: "Female".to_string(),
            senior_citizen: "0".to_string(),
            partner: "No".to_string(),
            dependents: "No".to_string(),
            tenure,
            monthly_charges: monthly,
            total_charges: Some(tenure * monthly),
            churn,
        }
    }

    #[test]
    fn contracts_keep_first_appearance_order() {
        let ds = ChurnDataset::from_records(vec![
            customer("Two year", 40.0, 50.0, Churn::No),
            customer("Month-to-month", 2.0, 80.0, Churn::Yes),
            customer("Two year", 60.0, 20.0, Churn::No),
            customer("One year", 12.0, 30.0, Churn::No),
        ]);
        assert_eq!(ds.contracts(), ["Two year", "Month-to-month", "One year"]);
    }

    #[test]
    fn summary_covers_all_records() {
        let ds = ChurnDataset::from_records(vec![
            customer("Two year", 40.0, 50.0, Churn::No),
            customer("Month-to-month", 2.0, 80.0, Churn::Yes),
        ]);
        let s = ds.summary();
        assert_eq!(s.customers, 2);
        assert_eq!(s.churn_rate, 50.0);
        assert_eq!(s.avg_tenure, 21.0);
    }

    #[test]
    fn view_skips_out_of_range_indices() {
        let ds = ChurnDataset::from_records(vec![customer("Two year", 1.0, 1.0, Churn::No)]);
        assert_eq!(ds.view(&[0, 5]).len(), 1);
    }

    #[test]
    fn churn_parses_common_spellings() {
        assert_eq!("Yes".parse::<Churn>().unwrap(), Churn::Yes);
        assert_eq!(" no ".parse::<Churn>().unwrap(), Churn::No);
        assert_eq!("1".parse::<Churn>().unwrap(), Churn::Yes);
        assert!("maybe".parse::<Churn>().is_err());
    }

    #[test]
    fn record_decodes_numeric_categories_and_blank_totals() {
        let json = r#"{
            "customerID": "7590-VHVEG",
            "Contract": "Month-to-month", "PaymentMethod": "Electronic check",
            "InternetService": "DSL", "OnlineSecurity": "No", "TechSupport": "No",
            "StreamingTV": "No", "Gender": "Female", "SeniorCitizen": 0,
            "Partner": "Yes", "Dependents": "No", "Tenure": 1,
            "MonthlyCharges": 29.85, "TotalCharges": " ", "Churn": "No"
        }"#;
        let rec: CustomerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.senior_citizen, "0");
        assert_eq!(rec.total_charges, None);
        assert_eq!(rec.measure(Measure::Tenure), Some(1.0));
        assert_eq!(rec.category(Category::StreamingTV), "No");
    }

    #[test]
    fn numeric_labels_have_one_spelling() {
        assert_eq!(normalize_label("1.0"), "1");
        assert_eq!(normalize_label(" 1 "), "1");
        assert_eq!(normalize_label("1e3"), "1000");
        assert_eq!(normalize_label("0.5"), "0.5");
        assert_eq!(normalize_label("Fiber optic"), "Fiber optic");
        assert_eq!(normalize_label("true"), "true");
        // the JSON decoder agrees with the text path
        let from_json = |v: serde_json::Value| label(v).unwrap();
        assert_eq!(from_json(serde_json::json!(1.0)), normalize_label("1.0"));
        assert_eq!(from_json(serde_json::json!("1e3")), normalize_label("1e3"));
    }

    #[test]
    fn required_columns_lists_every_field() {
        let cols: Vec<_> = required_columns().collect();
        assert_eq!(cols.len(), 14);
        assert!(cols.contains(&"StreamingTV"));
        assert!(cols.contains(&"Churn"));
    }
}
