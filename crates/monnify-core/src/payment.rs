//! Fixed-value processor enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MonnifyError;

/// How an outbound call authenticates.
///
/// The processor requires basic auth on some route families and an OAuth2
/// bearer token on others; the choice is per endpoint, not per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMode {
    /// HTTP basic auth with the API key and secret key.
    Basic,
    /// Bearer token obtained from the login endpoint.
    Bearer,
}

/// Payment method accepted on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Card payment.
    Card,
    /// Bank transfer into a reserved or dynamic account.
    AccountTransfer,
}

impl PaymentMethod {
    /// Numeric identifier.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Card => 1,
            Self::AccountTransfer => 2,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::AccountTransfer => "ACCOUNT_TRANSFER",
        }
    }

    /// Look up a method by numeric identifier.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Card),
            2 => Some(Self::AccountTransfer),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = MonnifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(Self::Card),
            "ACCOUNT_TRANSFER" => Ok(Self::AccountTransfer),
            other => Err(MonnifyError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// What a bulk transfer does when one item fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OnFailureValidate {
    /// Stop the whole batch.
    Break,
    /// Skip the failed item and continue.
    Continue,
}

impl OnFailureValidate {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Break => "BREAK",
            Self::Continue => "CONTINUE",
        }
    }
}

impl fmt::Display for OnFailureValidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnFailureValidate {
    type Err = MonnifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BREAK" => Ok(Self::Break),
            "CONTINUE" => Ok(Self::Continue),
            _ => Err(MonnifyError::UnknownOnFailureValidate(s.to_string())),
        }
    }
}
