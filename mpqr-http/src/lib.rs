//! HTTP transport for MercadoPago QR payment orders.
//!
//! Provides [`HttpDispatcher`], a `reqwest`-based implementation of
//! [`mpqr::dispatch::Dispatcher`] that talks to `https://api.mercadopago.com`.
//!
//! # Modules
//!
//! - [`constants`] - API base URL and default timeout
//! - [`error`] - Transport error types
//! - [`client`] - The HTTP dispatcher
//!
//! # Example
//!
//! ```no_run
//! use mpqr::{Credentials, LineItem, OrderConfig, QrOrderNode};
//! use mpqr_http::HttpDispatcher;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let node = QrOrderNode::new(HttpDispatcher::new());
//! let credentials = Credentials::new("APP_USR-...", "12345678");
//! let config = OrderConfig::new("Orden de compra", "Pago")
//!     .with_item(LineItem::new("Coffee", 2.5).with_quantity(2));
//!
//! let _records = node.execute(&config, &credentials).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;

pub use client::HttpDispatcher;
pub use error::DispatchError;
