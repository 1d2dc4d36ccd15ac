// Contract artifacts - the audit text embedded in every recorded action

use crate::governance::organization::OrganizationSummary;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Pseudo-contract text describing an organization and its fingerprint
///
/// Nothing is compiled or executed; the fingerprint stands in for bytecode so
/// a block can be matched against the state it describes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractArtifact {
    source: String,
    bytecode: String,
}

impl ContractArtifact {
    /// Render the contract for an organization summary
    pub fn from_summary(summary: &OrganizationSummary) -> Self {
        Self::from_source(render_contract(summary))
    }

    /// Wrap existing contract text
    pub fn from_source(source: String) -> Self {
        let bytecode = hex::encode(Sha256::digest(source.as_bytes()));
        Self { source, bytecode }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytecode(&self) -> &str {
        &self.bytecode
    }

    pub fn into_parts(self) -> (String, String) {
        (self.source, self.bytecode)
    }
}

fn render_contract(summary: &OrganizationSummary) -> String {
    format!(
        "// DAO Smart Contract for {name}\n\
         // DAO ID: {id}\n\
         // Founders: {founders}\n\
         // Token: {token}\n\
         // Initial Supply: {supply}\n\
         // Governance Rules: {rules}\n\
         // Members: {members}\n\
         // Proposals: {proposals}\n",
        name = summary.name,
        id = summary.id.to_hex(),
        founders = summary.founders.join(", "),
        token = summary.token_name,
        supply = summary.initial_supply,
        rules = summary.rules,
        members = summary.members.join(", "),
        proposals = summary.proposals.len(),
    )
}
