//! Writes a synthetic `TelecomCustomerChurn.csv` / `.parquet` pair.
//!
//! Churn odds follow the usual telecom patterns: month-to-month contracts,
//! short tenure, electronic checks and high bills all raise them.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const CUSTOMERS: usize = 7043;
const CSV_PATH: &str = "TelecomCustomerChurn.csv";
const PARQUET_PATH: &str = "TelecomCustomerChurn.parquet";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick from `(value, weight)` pairs.
    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(value, weight) in choices {
            if roll < weight {
                return value;
            }
            roll -= weight;
        }
        choices.last().map(|(v, _)| *v).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Row {
    #[serde(rename = "customerID")]
    customer_id: String,
    gender: &'static str,
    senior_citizen: i64,
    partner: &'static str,
    dependents: &'static str,
    tenure: i64,
    internet_service: &'static str,
    online_security: &'static str,
    tech_support: &'static str,
    #[serde(rename = "StreamingTV")]
    streaming_tv: &'static str,
    contract: &'static str,
    payment_method: &'static str,
    monthly_charges: f64,
    /// Blank for customers in their first month, as in real exports.
    total_charges: Option<f64>,
    churn: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn generate_customer(id: usize, rng: &mut SimpleRng) -> Row {
    let contract = rng.weighted(&[
        ("Month-to-month", 0.55),
        ("One year", 0.21),
        ("Two year", 0.24),
    ]);
    let max_tenure = match contract {
        "Month-to-month" => 40.0,
        "One year" => 60.0,
        _ => 72.0,
    };
    let tenure = (rng.next_f64().powf(0.8) * max_tenure).round() as i64;

    let internet = rng.weighted(&[("DSL", 0.34), ("Fiber optic", 0.44), ("No", 0.22)]);
    let service = |rng: &mut SimpleRng, p: f64| -> &'static str {
        if internet == "No" {
            "No internet service"
        } else {
            yes_no(rng.chance(p))
        }
    };
    let online_security = service(rng, 0.35);
    let tech_support = service(rng, 0.35);
    let streaming_tv = service(rng, 0.5);

    let payment = rng.weighted(&[
        ("Electronic check", 0.34),
        ("Mailed check", 0.23),
        ("Bank transfer (automatic)", 0.22),
        ("Credit card (automatic)", 0.21),
    ]);

    let base = match internet {
        "Fiber optic" => 70.0,
        "DSL" => 45.0,
        _ => 20.0,
    };
    let extras = [online_security, tech_support, streaming_tv]
        .iter()
        .filter(|s| **s == "Yes")
        .count() as f64;
    let monthly = ((base + extras * 8.0 + rng.next_f64() * 15.0) * 100.0).round() / 100.0;
    let total = (tenure > 0).then(|| ((monthly * tenure as f64) * 100.0).round() / 100.0);

    let mut churn_p: f64 = match contract {
        "Month-to-month" => 0.40,
        "One year" => 0.11,
        _ => 0.03,
    };
    if tenure < 12 {
        churn_p += 0.15;
    }
    if payment == "Electronic check" {
        churn_p += 0.10;
    }
    if monthly > 80.0 {
        churn_p += 0.07;
    }
    if tech_support == "Yes" {
        churn_p -= 0.08;
    }

    let senior = rng.chance(0.16);
    Row {
        customer_id: format!("{:04}-SYNTH", id),
        gender: if rng.chance(0.5) { "Male" } else { "Female" },
        senior_citizen: senior as i64,
        partner: yes_no(rng.chance(0.48)),
        dependents: yes_no(rng.chance(0.3)),
        tenure,
        internet_service: internet,
        online_security,
        tech_support,
        streaming_tv,
        contract,
        payment_method: payment,
        monthly_charges: monthly,
        total_charges: total,
        churn: yes_no(rng.chance(churn_p.clamp(0.01, 0.95))),
    }
}

fn write_csv(rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV output")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<(&str, DataType, bool, ArrayRef)> = vec![
        ("customerID", DataType::Utf8, false, text(|r| &r.customer_id)),
        ("Gender", DataType::Utf8, false, text(|r| r.gender)),
        (
            "SeniorCitizen",
            DataType::Int64,
            false,
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.senior_citizen))),
        ),
        ("Partner", DataType::Utf8, false, text(|r| r.partner)),
        ("Dependents", DataType::Utf8, false, text(|r| r.dependents)),
        (
            "Tenure",
            DataType::Int64,
            false,
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.tenure))),
        ),
        ("InternetService", DataType::Utf8, false, text(|r| r.internet_service)),
        ("OnlineSecurity", DataType::Utf8, false, text(|r| r.online_security)),
        ("TechSupport", DataType::Utf8, false, text(|r| r.tech_support)),
        ("StreamingTV", DataType::Utf8, false, text(|r| r.streaming_tv)),
        ("Contract", DataType::Utf8, false, text(|r| r.contract)),
        ("PaymentMethod", DataType::Utf8, false, text(|r| r.payment_method)),
        (
            "MonthlyCharges",
            DataType::Float64,
            false,
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.monthly_charges))),
        ),
        (
            "TotalCharges",
            DataType::Float64,
            true,
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.total_charges).collect::<Vec<_>>(),
            )),
        ),
        ("Churn", DataType::Utf8, false, text(|r| r.churn)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, ty, nullable, _)| Field::new(*name, ty.clone(), *nullable))
            .collect::<Vec<_>>(),
    ));
    let arrays = columns.into_iter().map(|(_, _, _, array)| array).collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows: Vec<Row> = (0..CUSTOMERS)
        .map(|id| generate_customer(id, &mut rng))
        .collect();

    write_csv(&rows)?;
    write_parquet(&rows)?;

    let churned = rows.iter().filter(|r| r.churn == "Yes").count();
    println!(
        "Wrote {} customers ({churned} churned) to {CSV_PATH} and {PARQUET_PATH}",
        rows.len()
    );
    Ok(())
}
