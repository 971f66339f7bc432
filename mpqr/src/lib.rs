#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for creating MercadoPago QR payment orders.
//!
//! This crate turns a node configuration (title, description, optional
//! external reference and a list of line items) into the request body
//! expected by MercadoPago's in-store QR order endpoint, and derives the
//! endpoint path from the account credentials. It performs no I/O on its
//! own: the network call is delegated to a [`dispatch::Dispatcher`], with a
//! `reqwest`-based implementation living in the `mpqr-http` crate.
//!
//! # Overview
//!
//! A single invocation builds one order and sends exactly one request:
//!
//! 1. [`credentials::Credentials`] are checked for blank fields.
//! 2. [`order::build_order`] validates the items, computes line and order
//!    totals and fills in a generated external reference when needed.
//! 3. [`node::QrOrderNode`] posts the body to
//!    `/instore/orders/qr/seller/collectors/{userId}/pos/{externalPosId}/qrs`
//!    and returns the raw JSON response as output records.
//!
//! # Modules
//!
//! - [`credentials`] - Account credentials and endpoint path derivation
//! - [`dispatch`] - The transport seam used to send requests
//! - [`error`] - Validation and node error types
//! - [`item`] - Line items and units of measure
//! - [`node`] - The QR order node tying building and dispatch together
//! - [`order`] - Order configuration, wire types and the order builder
//! - [`reference`] - Clocks and external reference generation
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod item;
pub mod node;
pub mod order;
pub mod reference;

pub use credentials::Credentials;
pub use error::{NodeError, ValidationError};
pub use item::{LineItem, UnitMeasure};
pub use node::QrOrderNode;
pub use order::{OrderConfig, OrderRequest, WireItem, build_order};
