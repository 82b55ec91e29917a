//! Access-layer configuration.

/// Configuration for the subscription and gating services.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// VAT rate applied on top of discounted plan prices (e.g. `0.20`).
    /// A jurisdiction setting — never folded into stored plan prices.
    pub vat_rate: f64,
    /// Maximum accepted payment-proof size in bytes (default: 5 MB).
    pub max_proof_bytes: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            vat_rate: 0.20,
            max_proof_bytes: 5 * 1024 * 1024,
        }
    }
}
