//! Check command implementation.

use super::{core_verifier, CommandResult};
use crate::input::read_vaa;
use crate::output::format_json;
use reseal_pipeline::{PipelineConfig, ValidityOracle};

pub fn run(config: &PipelineConfig, vaa: String) -> CommandResult {
    let bytes = read_vaa(&vaa)?;
    let http = config.http_client()?;
    let verifier = core_verifier(config, &http);

    let verdict = config.retry.run("verify", || verifier.verify(&bytes))?;
    println!("{}", format_json(&verdict));
    Ok(())
}
