//! End-to-end batch runs against files on disk.

use std::fs;
use std::path::Path;

use fxenrich::{run_batch, DuplicatePolicy, JobConfig, JobContext, LocalStore, PipelineError};
use serde_json::Value;

const TRANSACTIONS: &str = "\
account_no,value_date,transaction_details,withdrawal_currency,withdrawal_amt,deposit_currency,deposit_amt
409000611074',05-Jan-23,TRF TO ACME, USD ,100,,0
409000611074',05-Jan-23,FX RECEIPT,,,EUR,\"1,000.00\"
409000611074',06-Jan-23,CARD SPEND,EUR,40,,
409000611074',6 Jan 2023,BAD DATE,USD,10,,
409000611074',07-Jan-23,LOCAL,,,,250
";

fn write_rates(dir: &Path) {
    fs::create_dir_all(dir.join("2023-01-05")).unwrap();
    fs::create_dir_all(dir.join("2023-01-06")).unwrap();
    fs::write(
        dir.join("2023-01-05/part-00000.csv"),
        "run_date;target_currency;rates_base_sgd;source\n2023-01-05;USD;1.35;api\n2023-01-05;EUR ;1.44;api\n",
    )
    .unwrap();
    fs::write(
        dir.join("2023-01-06/part-00000.csv"),
        "run_date,target_currency,rates_base_sgd\n2023-01-06,USD,1.34\n",
    )
    .unwrap();
}

fn setup(root: &Path) -> (String, String) {
    let txns = root.join("banktxn.csv");
    fs::write(&txns, TRANSACTIONS).unwrap();
    let rates = root.join("rates");
    write_rates(&rates);
    (
        txns.to_string_lossy().to_string(),
        rates.to_string_lossy().to_string(),
    )
}

#[test]
fn test_json_output_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (txns, rates) = setup(dir.path());
    let output = dir.path().join("processed").join("banktxn.json");

    let ctx = JobContext::new(
        JobConfig::new(txns, rates, output.to_string_lossy()),
        LocalStore::new(),
    );
    let report = run_batch(&ctx).unwrap();

    assert_eq!(report.rows_written, 5);
    assert_eq!(report.stats.input_rows, 5);
    assert_eq!(report.stats.malformed_dates, 1);
    assert_eq!(report.stats.rate_rows, 3);

    let rows: Vec<Value> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(rows.len(), 5);

    // USD withdrawal with padded currency
    assert_eq!(rows[0]["value_date"], "2023-01-05");
    assert_eq!(rows[0]["withdrawal_currency"], "USD");
    assert_eq!(rows[0]["withdrawal_sgd"], 1.35);
    assert!((rows[0]["withdrawal_sgd_amt"].as_f64().unwrap() - 135.0).abs() < 1e-9);
    assert_eq!(rows[0]["deposit_currency"], Value::Null);
    assert_eq!(rows[0]["deposit_sgd"], Value::Null);
    assert_eq!(rows[0]["deposit_sgd_amt"], 0.0);
    assert_eq!(rows[0]["transaction_details"], "TRF TO ACME");

    // EUR deposit, rate currency padded in the rate file
    assert_eq!(rows[1]["deposit_sgd"], 1.44);
    assert!((rows[1]["deposit_sgd_amt"].as_f64().unwrap() - 1440.0).abs() < 1e-9);
    assert_eq!(rows[1]["deposit_amt"], "1,000.00");

    // EUR withdrawal with no EUR rate on 06-Jan
    assert_eq!(rows[2]["withdrawal_sgd"], Value::Null);
    assert_eq!(rows[2]["withdrawal_sgd_amt"], 0.0);
    assert_eq!(rows[2]["withdrawal_rate_found"], false);

    // Malformed date survives unenriched
    assert_eq!(rows[3]["value_date"], Value::Null);
    assert_eq!(rows[3]["transaction_details"], "BAD DATE");
    assert_eq!(rows[3]["withdrawal_sgd_amt"], 0.0);

    // Local-currency row
    assert_eq!(rows[4]["withdrawal_currency"], Value::Null);
    assert_eq!(rows[4]["deposit_sgd_amt"], 0.0);
}

#[test]
fn test_csv_output_keeps_source_columns_first() {
    let dir = tempfile::tempdir().unwrap();
    let (txns, rates) = setup(dir.path());
    let output = dir.path().join("processed.csv");

    let ctx = JobContext::new(
        JobConfig::new(txns, rates, output.to_string_lossy()),
        LocalStore::new(),
    );
    run_batch(&ctx).unwrap();

    let content = fs::read_to_string(&output).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "account_no,value_date,transaction_details,withdrawal_currency,withdrawal_amt,deposit_currency,deposit_amt,\
         withdrawal_sgd,deposit_sgd,withdrawal_sgd_amt,deposit_sgd_amt,withdrawal_rate_found,deposit_rate_found"
    );
    assert_eq!(
        lines.next().unwrap(),
        "409000611074',2023-01-05,TRF TO ACME,USD,100,,0,1.35,,135,0,true,false"
    );
}

#[test]
fn test_rerun_overwrites_output() {
    let dir = tempfile::tempdir().unwrap();
    let (txns, rates) = setup(dir.path());
    let output = dir.path().join("processed.csv");

    let ctx = JobContext::new(
        JobConfig::new(txns, rates, output.to_string_lossy()),
        LocalStore::new(),
    );
    run_batch(&ctx).unwrap();
    let first = fs::read_to_string(&output).unwrap();
    run_batch(&ctx).unwrap();
    let second = fs::read_to_string(&output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_duplicate_rates_abort_before_write() {
    let dir = tempfile::tempdir().unwrap();
    let (txns, rates) = setup(dir.path());
    fs::write(
        Path::new(&rates).join("2023-01-05/part-00001.csv"),
        "run_date,target_currency,rates_base_sgd\n2023-01-05,USD,1.36\n",
    )
    .unwrap();
    let output = dir.path().join("processed.csv");

    let ctx = JobContext::new(
        JobConfig::new(txns.clone(), rates.clone(), output.to_string_lossy()),
        LocalStore::new(),
    );
    let err = run_batch(&ctx).unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateRates { count: 1, .. }));
    assert!(!output.exists());

    let ctx = JobContext::new(
        JobConfig::new(txns, rates, output.to_string_lossy())
            .with_duplicate_policy(DuplicatePolicy::FanOut),
        LocalStore::new(),
    );
    let report = run_batch(&ctx).unwrap();
    assert_eq!(report.rows_written, 6);
    assert_eq!(report.stats.withdrawal.fan_out, 1);
}

#[test]
fn test_missing_rates_location_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (txns, _) = setup(dir.path());
    let output = dir.path().join("processed.csv");

    let ctx = JobContext::new(
        JobConfig::new(txns, dir.path().join("nope").to_string_lossy(), output.to_string_lossy()),
        LocalStore::new(),
    );

    assert!(run_batch(&ctx).is_err());
    assert!(!output.exists());
}
