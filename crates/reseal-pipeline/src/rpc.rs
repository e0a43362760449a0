//! JSON-RPC collaborators: transaction receipts on Ethereum and Solana and
//! the read-only core contract verifier.

use crate::abi::{decode_verify_result, encode_bytes_call, PARSE_AND_VERIFY_VM};
use crate::errors::PipelineError;
use crate::traits::{ReceiptSource, ValidityOracle, Verdict};
use regex::Regex;
use reqwest::blocking::Client;
use reseal_canonical::{EmitterAddress, VaaId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::debug;

/// Wormhole chain id of Ethereum.
pub const ETHEREUM_CHAIN_ID: u16 = 2;
/// Wormhole chain id of Solana.
pub const SOLANA_CHAIN_ID: u16 = 1;

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Minimal blocking JSON-RPC 2.0 client.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http: Client,
    url: String,
}

impl JsonRpcClient {
    /// Creates a client for the endpoint at `url`.
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Calls `method`; a `null` result comes back as `None`.
    pub fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, PipelineError> {
        debug!(url = %self.url, method, "JSON-RPC call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self.http.post(&self.url).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }
        let envelope: RpcResponse<T> = response.json()?;
        if let Some(err) = envelope.error {
            return Err(PipelineError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(envelope.result)
    }
}

/// One EVM log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: String,
    /// Indexed topics, `0x` hex.
    pub topics: Vec<String>,
    /// Unindexed data, `0x` hex.
    pub data: String,
}

#[derive(Deserialize)]
struct TransactionReceipt {
    logs: Vec<LogEntry>,
}

/// Extracts attestation ids from the core contract's `LogMessagePublished`
/// events. Logs from other contracts or with other topics are ignored.
pub fn vaa_ids_from_logs(
    logs: &[LogEntry],
    core_contract: &str,
    message_topic: &str,
) -> Result<Vec<VaaId>, PipelineError> {
    let mut ids = Vec::new();
    for log in logs {
        if !log.address.eq_ignore_ascii_case(core_contract) {
            continue;
        }
        match log.topics.first() {
            Some(topic) if topic.eq_ignore_ascii_case(message_topic) => {}
            _ => continue,
        }
        let sender = log.topics.get(1).ok_or_else(|| {
            PipelineError::InvalidResponse("LogMessagePublished without sender topic".into())
        })?;
        let emitter = EmitterAddress::parse(sender)?;
        let sequence = sequence_from_data(&log.data)?;
        ids.push(VaaId::new(ETHEREUM_CHAIN_ID, emitter, sequence));
    }
    Ok(ids)
}

fn sequence_from_data(data: &str) -> Result<u64, PipelineError> {
    let bytes = hex::decode(data.strip_prefix("0x").unwrap_or(data))?;
    let word = bytes.get(..32).ok_or_else(|| {
        PipelineError::InvalidResponse(format!("log data too short: {} bytes", bytes.len()))
    })?;
    if word[..24].iter().any(|b| *b != 0) {
        return Err(PipelineError::InvalidResponse(
            "log sequence exceeds 64 bits".into(),
        ));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(low))
}

/// Receipt source backed by an Ethereum JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct EthereumReceipts {
    rpc: JsonRpcClient,
    core_contract: String,
    message_topic: String,
}

impl EthereumReceipts {
    /// Creates a receipt source watching `core_contract` for `message_topic`.
    pub fn new(
        rpc: JsonRpcClient,
        core_contract: impl Into<String>,
        message_topic: impl Into<String>,
    ) -> Self {
        Self {
            rpc,
            core_contract: core_contract.into(),
            message_topic: message_topic.into(),
        }
    }
}

impl ReceiptSource for EthereumReceipts {
    fn vaa_ids(&self, tx_hash: &str) -> Result<Vec<VaaId>, PipelineError> {
        let receipt: TransactionReceipt = self
            .rpc
            .call("eth_getTransactionReceipt", json!([tx_hash]))?
            .ok_or_else(|| PipelineError::NotFound(format!("receipt for {}", tx_hash)))?;
        vaa_ids_from_logs(&receipt.logs, &self.core_contract, &self.message_topic)
    }
}

/// Sequence number announced in a Solana transaction's program logs.
pub fn sequence_from_logs(logs: &[String]) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"Program log: Sequence: (\d+)").expect("invalid regex"));
    logs.iter()
        .find_map(|line| re.captures(line))
        .and_then(|caps| caps[1].parse().ok())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolanaTransaction {
    meta: Option<SolanaMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolanaMeta {
    #[serde(default)]
    log_messages: Vec<String>,
}

/// Receipt source backed by a Solana JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct SolanaReceipts {
    rpc: JsonRpcClient,
    emitter: EmitterAddress,
}

impl SolanaReceipts {
    /// Creates a receipt source attributing messages to `emitter`.
    pub fn new(rpc: JsonRpcClient, emitter: EmitterAddress) -> Self {
        Self { rpc, emitter }
    }
}

impl ReceiptSource for SolanaReceipts {
    fn vaa_ids(&self, tx_hash: &str) -> Result<Vec<VaaId>, PipelineError> {
        let params = json!([tx_hash, {"encoding": "json", "maxSupportedTransactionVersion": 0}]);
        let tx: SolanaTransaction = self
            .rpc
            .call("getTransaction", params)?
            .ok_or_else(|| PipelineError::NotFound(format!("transaction {}", tx_hash)))?;
        let logs = tx.meta.map(|m| m.log_messages).unwrap_or_default();
        Ok(sequence_from_logs(&logs)
            .map(|seq| VaaId::new(SOLANA_CHAIN_ID, self.emitter, seq))
            .into_iter()
            .collect())
    }
}

/// Validity oracle calling `parseAndVerifyVM` on the core contract.
#[derive(Debug, Clone)]
pub struct CoreVerifier {
    rpc: JsonRpcClient,
    core_contract: String,
}

impl CoreVerifier {
    /// Creates a verifier for the core contract at `core_contract`.
    pub fn new(rpc: JsonRpcClient, core_contract: impl Into<String>) -> Self {
        Self {
            rpc,
            core_contract: core_contract.into(),
        }
    }
}

impl ValidityOracle for CoreVerifier {
    fn verify(&self, vaa: &[u8]) -> Result<Verdict, PipelineError> {
        let data = encode_bytes_call(PARSE_AND_VERIFY_VM, vaa);
        let call = json!({
            "to": self.core_contract,
            "data": format!("0x{}", hex::encode(data)),
        });
        let output: String = self
            .rpc
            .call("eth_call", json!([call, "latest"]))?
            .ok_or_else(|| PipelineError::InvalidResponse("eth_call returned null".into()))?;
        let bytes = hex::decode(output.strip_prefix("0x").unwrap_or(&output))?;
        decode_verify_result(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: &str = "0x98f3c9e6E3fAce36bAAd05FE09d375Ef1464288B";
    const TOPIC: &str = "0x6eb224fb001ed210e379b335e35efe88672a8ce935d981a6896b27ffdf52a3b2";
    const SENDER: &str = "0x0000000000000000000000003ee18b2214aff97000d974cf647e7c347e8fa585";

    fn message_log(sequence: u64) -> LogEntry {
        LogEntry {
            address: CORE.to_lowercase(),
            topics: vec![TOPIC.into(), SENDER.into()],
            data: format!("0x{:064x}{}", sequence, "00".repeat(96)),
        }
    }

    #[test]
    fn message_logs_yield_ids_in_order() {
        let other = LogEntry {
            address: "0x0000000000000000000000000000000000000001".into(),
            topics: vec![TOPIC.into(), SENDER.into()],
            data: format!("0x{:064x}", 1),
        };
        let logs = vec![message_log(164170), other, message_log(164171)];
        let ids = vaa_ids_from_logs(&logs, CORE, TOPIC).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].chain, ETHEREUM_CHAIN_ID);
        assert_eq!(ids[0].emitter, EmitterAddress::parse(SENDER).unwrap());
        assert_eq!(ids[0].sequence, 164170);
        assert_eq!(ids[1].sequence, 164171);
    }

    #[test]
    fn unrelated_topics_are_ignored() {
        let mut log = message_log(5);
        log.topics[0] = format!("0x{}", "11".repeat(32));
        assert!(vaa_ids_from_logs(&[log], CORE, TOPIC).unwrap().is_empty());
    }

    #[test]
    fn short_log_data_is_rejected() {
        let mut log = message_log(5);
        log.data = "0x01".into();
        assert!(matches!(
            vaa_ids_from_logs(&[log], CORE, TOPIC),
            Err(PipelineError::InvalidResponse(_))
        ));
    }

    #[test]
    fn solana_sequence_is_found_in_logs() {
        let logs = vec![
            "Program worm2ZoG2kUd4vFXhvjh93UUH596ayRfgQ2MgjNMTth invoke [2]".to_string(),
            "Program log: Sequence: 784512".to_string(),
            "Program log: Sequence: 9".to_string(),
        ];
        assert_eq!(sequence_from_logs(&logs), Some(784512));
    }

    #[test]
    fn solana_logs_without_sequence_yield_nothing() {
        let logs = vec!["Program log: Instruction: Transfer".to_string()];
        assert_eq!(sequence_from_logs(&logs), None);
    }
}
