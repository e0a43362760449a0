//! Wormholescan REST client: signed attestations, the current roster and
//! guardian observations.

use crate::errors::PipelineError;
use crate::traits::{AttestationSource, GuardianSetSource, ObservationSource};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use reseal_canonical::{GuardianAddress, GuardianSet, VaaId};
use reseal_core::observation::HEX_SIGNATURE_LEN;
use reseal_core::Observation;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// `GET /v1/signed_vaa/{id}` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedVaaResponse {
    /// Base64 attestation bytes.
    pub vaa_bytes: String,
}

impl SignedVaaResponse {
    /// Decodes the base64 attestation.
    pub fn decode(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(STANDARD.decode(self.vaa_bytes.trim())?)
    }
}

/// Guardian roster as published by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardianSetRecord {
    /// Roster epoch.
    pub index: u32,
    /// Signing addresses in roster order.
    pub addresses: Vec<String>,
}

impl GuardianSetRecord {
    /// Validates the addresses and builds a roster snapshot.
    pub fn into_guardian_set(self) -> Result<GuardianSet, PipelineError> {
        let addresses = self
            .addresses
            .iter()
            .map(|a| GuardianAddress::parse(a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GuardianSet::new(self.index, addresses)?)
    }
}

/// `GET /v1/guardianset/current` response, or its inner roster object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GuardianSetDocument {
    /// `{"guardianSet": {...}}`
    Wrapped {
        /// Inner roster.
        #[serde(rename = "guardianSet")]
        guardian_set: GuardianSetRecord,
    },
    /// `{"index": .., "addresses": [..]}`
    Bare(GuardianSetRecord),
}

impl GuardianSetDocument {
    /// Parses a roster document from JSON text.
    pub fn from_json(text: &str) -> Result<GuardianSet, PipelineError> {
        let doc: GuardianSetDocument = serde_json::from_str(text)?;
        doc.into_guardian_set()
    }

    /// Validates the roster.
    pub fn into_guardian_set(self) -> Result<GuardianSet, PipelineError> {
        match self {
            GuardianSetDocument::Wrapped { guardian_set } => guardian_set.into_guardian_set(),
            GuardianSetDocument::Bare(record) => record.into_guardian_set(),
        }
    }
}

/// One entry of `GET /api/v1/observations/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    /// Signer address.
    pub guardian_addr: String,
    /// Signature, base64 or hex.
    pub signature: String,
}

impl ObservationRecord {
    /// Validates the address and decodes the signature transport encoding.
    ///
    /// Hex signatures are passed through as text; the engine decodes them.
    pub fn into_observation(self) -> Result<Observation, PipelineError> {
        let guardian_address = GuardianAddress::parse(&self.guardian_addr)?;
        let text = self.signature.trim();
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let signature = if digits.len() == HEX_SIGNATURE_LEN
            && digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            text.as_bytes().to_vec()
        } else {
            STANDARD.decode(text)?
        };
        Ok(Observation::new(guardian_address, signature))
    }
}

/// Parses an observation array from JSON text.
///
/// Records that fail validation are dropped with a debug log so one bad
/// entry does not hide the rest.
pub fn observations_from_json(text: &str) -> Result<Vec<Observation>, PipelineError> {
    let records: Vec<ObservationRecord> = serde_json::from_str(text)?;
    Ok(into_observations(records))
}

fn into_observations(records: Vec<ObservationRecord>) -> Vec<Observation> {
    records
        .into_iter()
        .filter_map(|record| {
            let addr = record.guardian_addr.clone();
            match record.into_observation() {
                Ok(obs) => Some(obs),
                Err(err) => {
                    debug!(guardian = %addr, error = %err, "dropping unparseable observation");
                    None
                }
            }
        })
        .collect()
}

/// Blocking Wormholescan client.
#[derive(Debug, Clone)]
pub struct WormholeScanClient {
    http: Client,
    base_url: String,
}

impl WormholeScanClient {
    /// Creates a client rooted at `base_url` (e.g. `https://api.wormholescan.io`).
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PipelineError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self.http.get(&url).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound(url));
        }
        if !status.is_success() {
            return Err(PipelineError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json()?)
    }
}

impl AttestationSource for WormholeScanClient {
    fn signed_vaa(&self, id: &VaaId) -> Result<Vec<u8>, PipelineError> {
        let response: SignedVaaResponse = self.get_json(&format!("/v1/signed_vaa/{}", id))?;
        response.decode()
    }
}

impl GuardianSetSource for WormholeScanClient {
    fn current_guardian_set(&self) -> Result<GuardianSet, PipelineError> {
        let doc: GuardianSetDocument = self.get_json("/v1/guardianset/current")?;
        doc.into_guardian_set()
    }
}

impl ObservationSource for WormholeScanClient {
    fn observations(&self, id: &VaaId) -> Result<Vec<Observation>, PipelineError> {
        let records: Vec<ObservationRecord> =
            self.get_json(&format!("/api/v1/observations/{}", id))?;
        Ok(into_observations(records))
    }
}
