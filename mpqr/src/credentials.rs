//! MercadoPago account credentials.
//!
//! Credentials are owned by the host's credential store. This crate only
//! reads them: to authenticate the request and to derive the QR order
//! endpoint path.

use serde::Deserialize;
use std::fmt;

use crate::error::ValidationError;

/// Point-of-sale identifier used when none is configured.
pub const DEFAULT_EXTERNAL_POS_ID: &str = "default";

/// Credentials for the MercadoPago API.
///
/// Field names are accepted in camelCase (`accessToken`) as well as
/// snake_case (`access_token`). The access token is redacted from
/// [`fmt::Debug`] output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Bearer token sent in the `Authorization` header.
    #[serde(alias = "access_token")]
    pub access_token: String,

    /// The seller's MercadoPago user id (collector id).
    #[serde(alias = "user_id")]
    pub user_id: String,

    /// External id of the point of sale that will show the QR code.
    #[serde(alias = "external_pos_id", default = "default_external_pos_id")]
    pub external_pos_id: String,

    /// Whether the access token belongs to a sandbox (test) account.
    #[serde(alias = "sandbox_mode", default)]
    pub sandbox_mode: bool,
}

fn default_external_pos_id() -> String {
    DEFAULT_EXTERNAL_POS_ID.to_owned()
}

impl Credentials {
    /// Creates credentials for the default point of sale, outside sandbox mode.
    #[must_use]
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
            external_pos_id: default_external_pos_id(),
            sandbox_mode: false,
        }
    }

    /// Sets the point-of-sale external id.
    #[must_use]
    pub fn with_external_pos_id(mut self, external_pos_id: impl Into<String>) -> Self {
        self.external_pos_id = external_pos_id.into();
        self
    }

    /// Sets sandbox mode.
    #[must_use]
    pub const fn with_sandbox_mode(mut self, sandbox_mode: bool) -> Self {
        self.sandbox_mode = sandbox_mode;
        self
    }

    /// Returns the path of the QR order endpoint for this seller and POS.
    ///
    /// Surrounding whitespace is stripped from both ids, the same way
    /// [`Credentials::validate`] reads them.
    ///
    /// ```rust
    /// use mpqr::Credentials;
    ///
    /// let credentials = Credentials::new("token", "U1").with_external_pos_id("P1");
    /// assert_eq!(
    ///     credentials.qr_orders_path(),
    ///     "/instore/orders/qr/seller/collectors/U1/pos/P1/qrs"
    /// );
    /// ```
    #[must_use]
    pub fn qr_orders_path(&self) -> String {
        format!(
            "/instore/orders/qr/seller/collectors/{}/pos/{}/qrs",
            self.user_id.trim(),
            self.external_pos_id.trim()
        )
    }

    /// Checks that no required field is blank once trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCredential`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("accessToken", &self.access_token),
            ("userId", &self.user_id),
            ("externalPosId", &self.external_pos_id),
        ];
        match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ValidationError::MissingCredential(name)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("external_pos_id", &self.external_pos_id)
            .field("sandbox_mode", &self.sandbox_mode)
            .finish()
    }
}
