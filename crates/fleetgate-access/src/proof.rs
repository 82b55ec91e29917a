//! Payment-proof upload validation and storage abstraction.
//!
//! Type and size constraints are enforced here, before the object
//! store is invoked — the store is not trusted to be the only
//! enforcement point.

use fleetgate_core::error::FleetResult;
use uuid::Uuid;

use crate::error::ProofError;

/// MIME types accepted for payment proofs.
pub const ALLOWED_PROOF_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// A payment-proof file as received from the client.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fast-fail validation of a proof upload.
pub fn validate(upload: &ProofUpload, max_bytes: usize) -> Result<(), ProofError> {
    if !ALLOWED_PROOF_TYPES.contains(&upload.content_type.as_str()) {
        return Err(ProofError::UnsupportedType(upload.content_type.clone()));
    }
    if upload.bytes.is_empty() {
        return Err(ProofError::Empty);
    }
    if upload.bytes.len() > max_bytes {
        return Err(ProofError::TooLarge {
            size: upload.bytes.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

/// External object store for proof files.
///
/// Implementations store the payload under a tenant-scoped path and
/// return a retrievable URL.
pub trait ProofStore: Send + Sync {
    fn store(
        &self,
        tenant_id: Uuid,
        upload: ProofUpload,
    ) -> impl Future<Output = FleetResult<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> ProofUpload {
        ProofUpload {
            file_name: "proof.pdf".into(),
            content_type: content_type.into(),
            bytes: vec![0u8; len],
        }
    }

    const MAX: usize = 5 * 1024 * 1024;

    #[test]
    fn accepts_pdf_jpeg_png() {
        for ty in ["application/pdf", "image/jpeg", "image/png"] {
            assert!(validate(&upload(ty, 1024), MAX).is_ok());
        }
    }

    #[test]
    fn rejects_other_types() {
        let err = validate(&upload("image/gif", 1024), MAX).unwrap_err();
        assert!(matches!(err, ProofError::UnsupportedType(_)));
    }

    #[test]
    fn rejects_oversized_files() {
        let err = validate(&upload("application/pdf", MAX + 1), MAX).unwrap_err();
        assert!(matches!(err, ProofError::TooLarge { .. }));
    }

    #[test]
    fn accepts_exactly_max_size() {
        assert!(validate(&upload("application/pdf", MAX), MAX).is_ok());
    }

    #[test]
    fn rejects_empty_files() {
        let err = validate(&upload("application/pdf", 0), MAX).unwrap_err();
        assert!(matches!(err, ProofError::Empty));
    }
}
