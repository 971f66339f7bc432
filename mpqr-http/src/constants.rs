//! MercadoPago API constants.

use std::time::Duration;

/// Base URL of the MercadoPago REST API.
pub const API_BASE_URL: &str = "https://api.mercadopago.com";

/// Default timeout applied to each request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
