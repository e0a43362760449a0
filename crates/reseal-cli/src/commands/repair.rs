//! Repair command implementation.

use super::{core_verifier, receipt_source, CommandResult};
use crate::output::{format_json, print_batch_rows, print_summary, print_table_header};
use reseal_pipeline::{Collaborators, Orchestrator, PipelineConfig, WormholeScanClient};

pub fn run(
    config: &PipelineConfig,
    txs: Vec<String>,
    solana: bool,
    workers: Option<usize>,
    json_output: bool,
) -> CommandResult {
    let http = config.http_client()?;
    let receipts = receipt_source(config, &http, solana);
    let scan = WormholeScanClient::new(http.clone(), config.wormholescan_api.clone());
    let verifier = core_verifier(config, &http);

    let orchestrator = Orchestrator::new(Collaborators {
        receipts: receipts.as_ref(),
        attestations: &scan,
        guardian_sets: &scan,
        observations: &scan,
        oracle: &verifier,
    })
    .with_retry(config.retry)
    .with_workers(workers.unwrap_or(config.workers));

    let batch = orchestrator.run_batch(&txs);
    let summary = batch.summary();

    if json_output {
        let output = serde_json::json!({
            "summary": summary,
            "transactions": batch.transactions,
        });
        println!("{}", format_json(&output));
    } else {
        print_table_header();
        print_batch_rows(&batch);
        print_summary(&summary);
    }
    Ok(())
}
