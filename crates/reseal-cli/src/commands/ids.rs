//! Ids command implementation.

use super::{receipt_source, CommandResult};
use reseal_pipeline::PipelineConfig;

pub fn run(config: &PipelineConfig, txs: Vec<String>, solana: bool) -> CommandResult {
    let http = config.http_client()?;
    let receipts = receipt_source(config, &http, solana);

    let mut failures = 0;
    for tx in &txs {
        match config.retry.run("vaa_ids", || receipts.vaa_ids(tx)) {
            Ok(ids) => {
                for id in ids {
                    println!("{}", id);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", tx, e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} transaction(s) failed", failures, txs.len()).into());
    }
    Ok(())
}
