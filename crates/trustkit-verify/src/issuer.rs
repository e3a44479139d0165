//! Credential issuance.

use std::sync::Arc;

use trustkit_core::Timestamp;
use trustkit_status::StatusListManager;
use trustkit_vc::{ProofEngine, SigningContext, VerifiableCredential};

use crate::error::IssueError;

/// Signs credentials, optionally registering them in status lists first.
#[derive(Debug)]
pub struct CredentialIssuer {
    proofs: Arc<ProofEngine>,
    status: Option<Arc<StatusListManager>>,
}

impl CredentialIssuer {
    pub fn new(proofs: Arc<ProofEngine>) -> Self {
        Self { proofs, status: None }
    }

    pub fn with_status_lists(mut self, status: Arc<StatusListManager>) -> Self {
        self.status = Some(status);
        self
    }

    /// Sign `credential` with `suite_id`.
    ///
    /// For every id in `status_lists` the credential is given an index and
    /// the matching `credentialStatus` entry is embedded before signing, so
    /// the proof covers it. A credential without an `id` receives a fresh
    /// `urn:uuid:` identifier, which is also its status-list identity. A
    /// missing `issuanceDate` is set to the proof creation time.
    ///
    /// Indices assigned before a signing failure stay assigned.
    pub async fn issue(
        &self,
        credential: &VerifiableCredential,
        suite_id: &str,
        ctx: &SigningContext,
        status_lists: &[&str],
    ) -> Result<VerifiableCredential, IssueError> {
        let mut credential = credential.clone();
        let created = ctx.created.unwrap_or_else(Timestamp::now);
        if credential.issuance_date.is_none() {
            credential.issuance_date = Some(*created.as_datetime());
        }

        if !status_lists.is_empty() {
            let status = self.status.as_ref().ok_or(IssueError::NoStatusManager)?;
            let identity = credential
                .id
                .get_or_insert_with(|| format!("urn:uuid:{}", uuid::Uuid::new_v4()))
                .clone();
            for list_id in status_lists {
                let entry = status.status_entry(list_id, &identity)?;
                credential.credential_status.push(entry);
            }
        }

        let ctx = ctx.clone().with_created(created);
        let signed = self.proofs.sign_credential(&credential, suite_id, &ctx).await?;
        tracing::debug!(
            credential_id = signed.id.as_deref().unwrap_or("-"),
            suite = suite_id,
            status_entries = status_lists.len(),
            "credential issued"
        );
        Ok(signed)
    }
}
