use crate::errors::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// `Open` serves every caller (trusted/local use). `Identity` requires the
/// OAuth front end to forward verified claims with each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    Open,
    Identity,
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "" | "open" | "none" => Ok(AccessMode::Open),
            "identity" | "oauth" => Ok(AccessMode::Identity),
            other => Err(format!(
                "unknown access mode '{}': expected open or identity",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    mode: AccessMode,
}

impl AccessGate {
    pub fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    /// Reads `params._meta.user` from a `tools/call` request. Open mode binds
    /// well-formed claims and ignores anything else; identity mode rejects
    /// missing or malformed claims.
    pub fn authorize(&self, params: &Value) -> Result<Option<Identity>, ToolError> {
        let claims = params
            .get("_meta")
            .and_then(|meta| meta.get("user"))
            .filter(|user| !user.is_null());

        match self.mode {
            AccessMode::Open => Ok(claims.and_then(|raw| parse_identity(raw).ok())),
            AccessMode::Identity => {
                let Some(raw) = claims else {
                    return Err(ToolError::denied("authentication required").with_hint(
                        "Sign in through the identity provider before calling reservation tools.",
                    ));
                };
                parse_identity(raw).map(Some)
            }
        }
    }
}

fn parse_identity(raw: &Value) -> Result<Identity, ToolError> {
    let identity: Identity = serde_json::from_value(raw.clone())
        .map_err(|_| ToolError::denied("authentication required: malformed identity claims"))?;
    if identity.id.trim().is_empty() {
        return Err(ToolError::denied(
            "authentication required: identity claims carry no user id",
        ));
    }
    Ok(identity)
}
