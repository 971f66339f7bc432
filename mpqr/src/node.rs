//! The QR order node.
//!
//! [`QrOrderNode`] is what a host runs once per invocation: it validates
//! the credentials, builds the order, sends exactly one `POST` through its
//! [`Dispatcher`] and returns the API's response as output records.

use serde::Serialize;
use serde_json::Value;

use crate::credentials::Credentials;
use crate::dispatch::{Dispatcher, Method};
use crate::error::{NodeError, ValidationError};
use crate::order::{OrderConfig, OrderRequest, build_order};
use crate::reference::{ReferenceGenerator, TimestampReferences};

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

/// A built order together with the endpoint path it will be sent to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedOrder {
    /// API path, relative to the base URL.
    pub path: String,
    /// Request body.
    pub body: OrderRequest,
}

/// Creates MercadoPago QR orders through a [`Dispatcher`].
#[derive(Debug)]
pub struct QrOrderNode<D, G = TimestampReferences> {
    dispatcher: D,
    references: G,
}

impl<D: Dispatcher> QrOrderNode<D> {
    /// Creates a node that generates missing references from the system clock.
    #[must_use]
    pub fn new(dispatcher: D) -> Self {
        Self::with_references(dispatcher, TimestampReferences::new())
    }
}

impl<D: Dispatcher, G: ReferenceGenerator> QrOrderNode<D, G> {
    /// Creates a node with a custom reference generator.
    #[must_use]
    pub const fn with_references(dispatcher: D, references: G) -> Self {
        Self {
            dispatcher,
            references,
        }
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Returns the reference generator.
    #[must_use]
    pub const fn references(&self) -> &G {
        &self.references
    }

    /// Validates the credentials and builds the order without sending it.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for blank credentials or an invalid order.
    pub fn prepare(
        &self,
        config: &OrderConfig,
        credentials: &Credentials,
    ) -> Result<PreparedOrder, ValidationError> {
        credentials.validate()?;
        let body = build_order(config, &self.references)?;
        Ok(PreparedOrder {
            path: credentials.qr_orders_path(),
            body,
        })
    }

    /// Builds the order and sends it, returning the response as output records.
    ///
    /// Nothing is sent when validation fails.
    ///
    /// # Errors
    ///
    /// - [`NodeError::Validation`] when the credentials or order are invalid
    /// - [`NodeError::Encode`] when the body cannot be encoded
    /// - [`NodeError::Transport`] with the dispatcher's error, unchanged
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "mpqr.node.execute",
            skip_all,
            err,
            fields(
                user_id = %credentials.user_id,
                external_pos_id = %credentials.external_pos_id,
                sandbox_mode = credentials.sandbox_mode,
            )
        )
    )]
    pub async fn execute(
        &self,
        config: &OrderConfig,
        credentials: &Credentials,
    ) -> Result<Vec<Value>, NodeError<D::Error>> {
        let prepared = self.prepare(config, credentials)?;
        let body = serde_json::to_value(&prepared.body).map_err(NodeError::Encode)?;

        #[cfg(feature = "telemetry")]
        debug!(path = %prepared.path, %body, "Sending QR order");

        let response = self
            .dispatcher
            .send(Method::Post, &prepared.path, &body, credentials)
            .await
            .map_err(NodeError::Transport)?;

        #[cfg(feature = "telemetry")]
        debug!(%response, "QR order created");

        Ok(into_records(response))
    }
}

/// Splits a JSON response into output records: one per element of an
/// array, otherwise the value itself.
#[must_use]
pub fn into_records(response: Value) -> Vec<Value> {
    match response {
        Value::Array(records) => records,
        other => vec![other],
    }
}
