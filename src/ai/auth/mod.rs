//! Credential flows for enterprise-hosted providers.

mod azure;

pub use azure::{AZURE_COGNITIVE_SCOPE, AzureCertificateCredential, CertificateMaterial};
