pub mod check;
pub mod ids;
pub mod inspect;
pub mod reconcile;
pub mod repair;

use reseal_pipeline::{
    CoreVerifier, EthereumReceipts, JsonRpcClient, PipelineConfig, ReceiptSource, SolanaReceipts,
};
use reqwest::blocking::Client;

pub(crate) type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Receipt source for the selected chain.
pub(crate) fn receipt_source(
    config: &PipelineConfig,
    http: &Client,
    solana: bool,
) -> Box<dyn ReceiptSource> {
    if solana {
        let rpc = JsonRpcClient::new(http.clone(), config.solana_rpc.clone());
        Box::new(SolanaReceipts::new(rpc, config.solana_emitter))
    } else {
        let rpc = JsonRpcClient::new(http.clone(), config.ethereum_rpc.clone());
        Box::new(EthereumReceipts::new(
            rpc,
            config.core_contract.clone(),
            config.message_topic.clone(),
        ))
    }
}

/// Validity oracle against the Ethereum core contract.
pub(crate) fn core_verifier(config: &PipelineConfig, http: &Client) -> CoreVerifier {
    let rpc = JsonRpcClient::new(http.clone(), config.ethereum_rpc.clone());
    CoreVerifier::new(rpc, config.core_contract.clone())
}
