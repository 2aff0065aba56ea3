//! Replay a CSV of transactions against a running HoneyGate server.
//!
//! Each row (minus the label column) is posted to `/predict` as
//! `{"features": [...]}`; rows answered with `fraud_prediction: 1` are
//! counted as fraudulent.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "honeygate-replay")]
#[command(version, about = "Send CSV transactions to a HoneyGate server and report the fraud rate")]
struct Args {
    /// CSV file with a header row
    #[arg(long)]
    csv: PathBuf,

    /// Prediction endpoint
    #[arg(long, default_value = "http://127.0.0.1:5000/predict")]
    url: String,

    /// Ground-truth column to drop before sending (ignored if absent)
    #[arg(long, default_value = "Class")]
    label_column: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_sec: u64,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    fraud_prediction: Option<u8>,
}

/// Transactions parsed from the CSV, label column removed
#[derive(Debug, PartialEq)]
struct Transactions {
    rows: Vec<Vec<f64>>,
}

fn parse_csv(raw: &str, label_column: &str) -> anyhow::Result<Transactions> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    if headers.is_empty() {
        bail!("CSV is empty");
    }
    let label_index = headers.iter().position(|name| name == label_column);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("row {}: malformed CSV record", i + 1))?;
        let row = record
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != label_index)
            .map(|(index, value)| {
                value
                    .parse::<f64>()
                    .with_context(|| format!("row {}, column {}: '{}' is not a number", i + 1, index, value))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("CSV has a header but no rows");
    }

    Ok(Transactions { rows })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.csv)
        .with_context(|| format!("Failed to read {}", args.csv.display()))?;
    let transactions = parse_csv(&raw, &args.label_column)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_sec))
        .build()
        .context("Failed to build HTTP client")?;

    println!("Sending {} transactions to {}...\n", transactions.rows.len(), args.url);

    let total = transactions.rows.len();
    let mut fraud_count = 0usize;
    let mut rejected = 0usize;

    for features in &transactions.rows {
        let result = client
            .post(&args.url)
            .json(&json!({ "features": features }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<PredictResponse>().await {
                    Ok(PredictResponse { fraud_prediction: Some(1) }) => fraud_count += 1,
                    Ok(_) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Ok(response) => {
                rejected += 1;
                eprintln!("Rejected: HTTP {}", response.status());
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    println!("TOTAL Transactions Tested: {}", total);
    println!("Fraudulent Transactions Detected: {}", fraud_count);
    println!("Legitimate Transactions: {}", total - fraud_count);
    println!("Rejected by gate or limiter: {}", rejected);
    println!("\nFraud Rate: {:.2}%", fraud_count as f64 / total as f64 * 100.0);

    Ok(())
}
