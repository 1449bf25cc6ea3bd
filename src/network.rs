//! Network constants for the custody API.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.protect.example.com";
