use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{
    normalize_label, required_columns, Category, ChurnDataset, Churn, CustomerRecord, Measure,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a churn dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names (the usual export)
/// * `.parquet` – one column per field, strings or numbers
/// * `.json`    – `[{ "Contract": "...", "Tenure": 12, ... }, ...]`
pub fn load_file(path: &Path) -> Result<ChurnDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::debug!("parsed {} records from {}", records.len(), path.display());
    Ok(ChurnDataset::from_records(records))
}

fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<String> = required_columns()
        .filter(|c| !present.contains(c))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one customer per line.
/// Columns beyond the known schema (e.g. `customerID`) are ignored.
fn load_csv(path: &Path) -> Result<Vec<CustomerRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    check_columns(headers.iter())?;

    reader
        .deserialize::<CustomerRecord>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {}", row_no + 1)))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Contract": "Month-to-month", "Tenure": 1, "MonthlyCharges": 29.85,
///     "TotalCharges": 29.85, "Churn": "No", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<CustomerRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    if let Some(first) = rows.first() {
        let obj = first.as_object().context("Row 0 is not a JSON object")?;
        check_columns(obj.keys().map(String::as_str))?;
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| CustomerRecord::deserialize(row).with_context(|| format!("JSON row {i}")))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Categorical columns may be strings, integers or booleans; numeric columns
/// may be any integer or float type, or strings holding numbers.  Works with
/// files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Vec<CustomerRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    {
        let schema = builder.schema();
        check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let categories = Category::ALL
            .into_iter()
            .map(|c| column(&batch, c.column_name()))
            .collect::<Result<Vec<_>>>()?;
        let tenure = column(&batch, Measure::Tenure.column_name())?;
        let monthly = column(&batch, Measure::MonthlyCharges.column_name())?;
        let total = column(&batch, Measure::TotalCharges.column_name())?;
        let churn_col = column(&batch, "Churn")?;

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let label = |i: usize| cell_label(categories[i], row);
            let required = |col: &ArrayRef, name: &'static str| -> Result<f64> {
                cell_number(col, row)
                    .and_then(|v| v.context("blank cell"))
                    .map_err(|e| LoadError::InvalidCell {
                        row: row_no,
                        column: name,
                        reason: format!("{e:#}"),
                    })
                    .map_err(anyhow::Error::from)
            };

            let churn: Churn = cell_label(churn_col, row)?
                .parse()
                .with_context(|| format!("Row {row_no}"))?;

            records.push(CustomerRecord {
                contract: label(0)?,
                payment_method: label(1)?,
                internet_service: label(2)?,
                online_security: label(3)?,
                tech_support: label(4)?,
                streaming_tv: label(5)?,
                gender: label(6)?,
                senior_citizen: label(7)?,
                partner: label(8)?,
                dependents: label(9)?,
                tenure: required(tenure, "Tenure")?,
                monthly_charges: required(monthly, "MonthlyCharges")?,
                total_charges: cell_number(total, row).map_err(|e| LoadError::InvalidCell {
                    row: row_no,
                    column: "TotalCharges",
                    reason: format!("{e:#}"),
                })?,
                churn,
            });
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet batch missing '{name}' column"))
}

/// Render any scalar cell as a trimmed label; nulls become empty strings.
fn cell_text(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    let text = array_value_to_string(col.as_ref(), row)
        .with_context(|| format!("formatting {:?} cell", col.data_type()))?;
    Ok(text.trim().to_string())
}

/// Like [`cell_text`], normalised the way CSV and JSON categoricals are.
fn cell_label(col: &ArrayRef, row: usize) -> Result<String> {
    Ok(normalize_label(&cell_text(col, row)?))
}

/// Extract a numeric cell.  Nulls and blank strings are `None`.
fn cell_number(col: &ArrayRef, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = cell_text(col, row)?;
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .with_context(|| format!("'{text}' is not a number"))?
        }
        other => anyhow::bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;

    const HEADER: &str = "customerID,Gender,SeniorCitizen,Partner,Dependents,Tenure,InternetService,\
OnlineSecurity,TechSupport,StreamingTV,Contract,PaymentMethod,MonthlyCharges,TotalCharges,Churn";

    fn temp_with_suffix(suffix: &str, body: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_and_ignores_extra_columns() {
        let body = format!(
            "{HEADER}\n\
7590-VHVEG,Female,0,Yes,No,1,DSL,No,No,No,Month-to-month,Electronic check,29.85,29.85,No\n\
5575-GNVDE,Male,0,No,No,34,DSL,Yes,No,No,One year,Mailed check,56.95,1889.5,No\n\
3668-QPYBK,Male,0,No,No,2,DSL,Yes,No,No,Month-to-month,Mailed check,53.85,108.15,Yes\n"
        );
        let file = temp_with_suffix(".csv", &body);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.contracts(), ["Month-to-month", "One year"]);
        let first = &ds.records()[0];
        assert_eq!(first.payment_method, "Electronic check");
        assert_eq!(first.senior_citizen, "0");
        assert_eq!(first.tenure, 1.0);
        assert_eq!(ds.records()[2].churn, Churn::Yes);
    }

    #[test]
    fn blank_total_charges_are_missing() {
        let body = format!(
            "{HEADER}\n\
4472-LVYGI,Female,0,Yes,Yes,0,DSL,Yes,Yes,Yes,Two year,Bank transfer (automatic),52.55, ,No\n"
        );
        let file = temp_with_suffix(".csv", &body);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records()[0].total_charges, None);
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let file = temp_with_suffix(".csv", "Contract,Tenure\nOne year,3\n");

        let err = load_file(file.path()).unwrap_err();
        let load_err = err.downcast_ref::<LoadError>().expect("schema error");
        match load_err {
            LoadError::MissingColumns(cols) => {
                assert!(cols.contains(&"Churn".to_string()));
                assert!(cols.contains(&"MonthlyCharges".to_string()));
                assert!(!cols.contains(&"Contract".to_string()));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn bad_churn_label_fails_with_row_context() {
        let body = format!(
            "{HEADER}\n\
7590-VHVEG,Female,0,Yes,No,1,DSL,No,No,No,Month-to-month,Electronic check,29.85,29.85,Perhaps\n"
        );
        let file = temp_with_suffix(".csv", &body);

        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = temp_with_suffix(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_records_oriented_json() {
        let body = r#"[
            {"Contract": "Two year", "PaymentMethod": "Credit card (automatic)",
             "InternetService": "No", "OnlineSecurity": "No internet service",
             "TechSupport": "No internet service", "StreamingTV": "No internet service",
             "Gender": "Male", "SeniorCitizen": 1, "Partner": "Yes", "Dependents": "Yes",
             "Tenure": 72, "MonthlyCharges": 19.9, "TotalCharges": 1400.0, "Churn": "No"}
        ]"#;
        let file = temp_with_suffix(".json", body);

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].senior_citizen, "1");
        assert_eq!(ds.records()[0].total_charges, Some(1400.0));
    }

    #[test]
    fn loads_parquet_with_mixed_column_types() {
        let text = |v: &str| -> ArrayRef { Arc::new(StringArray::from(vec![v, v])) };
        let mut fields = Vec::new();
        let mut columns: Vec<ArrayRef> = Vec::new();
        for cat in Category::ALL {
            fields.push(Field::new(cat.column_name(), DataType::Utf8, false));
            columns.push(match cat {
                Category::Contract => {
                    Arc::new(StringArray::from(vec!["One year", "Two year"])) as ArrayRef
                }
                _ => text("No"),
            });
        }
        // a float-typed categorical column, as pandas writes it
        let senior = fields
            .iter()
            .position(|f: &Field| f.name() == "SeniorCitizen")
            .unwrap();
        fields[senior] = Field::new("SeniorCitizen", DataType::Float64, false);
        columns[senior] = Arc::new(Float64Array::from(vec![1.0, 0.0]));
        fields.push(Field::new("Tenure", DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from(vec![5, 48])));
        fields.push(Field::new("MonthlyCharges", DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(vec![70.0, 25.5])));
        fields.push(Field::new("TotalCharges", DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from(vec![Some("350"), Some(" ")])));
        fields.push(Field::new("Churn", DataType::Utf8, false));
        columns.push(Arc::new(StringArray::from(vec!["Yes", "No"])));

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(out, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.contracts(), ["One year", "Two year"]);
        assert_eq!(ds.records()[0].tenure, 5.0);
        assert_eq!(ds.records()[0].total_charges, Some(350.0));
        assert_eq!(ds.records()[1].total_charges, None);
        assert_eq!(ds.records()[0].churn, Churn::Yes);
        assert_eq!(ds.records()[0].senior_citizen, "1");
        assert_eq!(ds.records()[1].senior_citizen, "0");
    }

    #[test]
    fn csv_and_json_agree_on_numeric_categories() {
        let csv = temp_with_suffix(
            ".csv",
            &format!(
                "{HEADER}\n\
0001-A,Female,1.0,Yes,No,5,DSL,No,No,No,One year,Mailed check,40.0,200.0,No\n"
            ),
        );
        let json = temp_with_suffix(
            ".json",
            r#"[{"Contract": "One year", "PaymentMethod": "Mailed check",
                "InternetService": "DSL", "OnlineSecurity": "No", "TechSupport": "No",
                "StreamingTV": "No", "Gender": "Female", "SeniorCitizen": "1",
                "Partner": "Yes", "Dependents": "No", "Tenure": 5,
                "MonthlyCharges": 40.0, "TotalCharges": 200.0, "Churn": "No"}]"#,
        );

        let from_csv = load_file(csv.path()).unwrap();
        let from_json = load_file(json.path()).unwrap();
        assert_eq!(from_csv.records()[0].senior_citizen, "1");
        assert_eq!(from_csv.records(), from_json.records());
    }
}
