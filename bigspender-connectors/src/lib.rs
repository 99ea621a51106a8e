//! Provider connectors: schema decoding, merchant cascades, and HTTP fetch
//! against the providers' session-cookie-authenticated JSON APIs.

pub mod auth;
pub mod bcge;
pub mod http;
pub mod viseca;
