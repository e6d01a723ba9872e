//! Lifecycle service for email records
//!
//! Decides which folder a record lands in and which transitions are legal,
//! then hands persistence to the store.

use log::{info, warn};
use std::sync::Arc;

use crate::error::{EmailError, Result};
use crate::models::{EmailId, EmailRecord, Folder, UserId};
use crate::storage::EmailStore;

/// Whether a save created a new record or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

impl SaveOutcome {
    /// HTTP-equivalent status for this outcome
    pub fn status_code(&self) -> u16 {
        match self {
            SaveOutcome::Created => 201,
            SaveOutcome::Updated => 200,
        }
    }
}

/// Result of a send
#[derive(Debug, Clone, PartialEq)]
pub struct SendResult {
    /// The record as finally stored, in the sent folder
    pub email: EmailRecord,
    /// Created if the input had no identifier, Updated otherwise
    pub outcome: SaveOutcome,
}

/// Service enforcing folder semantics on top of an [`EmailStore`]
///
/// Records move `draft -> draft -> outbox -> sent`. Nothing here moves a
/// record into the inbox; that folder is filled by delivery from outside.
pub struct EmailService {
    store: Arc<dyn EmailStore>,
}

impl EmailService {
    /// Create a new service over the given store
    pub fn new(store: Arc<dyn EmailStore>) -> Self {
        Self { store }
    }

    /// Direct access to the underlying store
    pub fn store(&self) -> &Arc<dyn EmailStore> {
        &self.store
    }

    /// All records in the user's inbox
    pub fn get_inbox(&self, user_id: UserId) -> Result<Vec<EmailRecord>> {
        self.store.list_emails_by_folder(user_id, Folder::Inbox)
    }

    /// Fetch one record, failing with `NotFound` when absent
    pub fn get_by_id(&self, user_id: UserId, email_id: EmailId) -> Result<EmailRecord> {
        self.store
            .get_email(user_id, email_id)?
            .ok_or(EmailError::NotFound { user_id, email_id })
    }

    /// Save a record as a draft owned by `user_id`
    ///
    /// Whatever owner and folder the caller supplied are overridden. A record
    /// without an identifier gets a new one; a record with one replaces the
    /// user's draft stored at that slot.
    pub fn create_draft(&self, user_id: UserId, email: EmailRecord) -> Result<EmailRecord> {
        if let Some(email_id) = email.id {
            self.require_existing(user_id, email_id, &[Folder::Draft])?;
        }
        let saved = self
            .store
            .upsert_email(email.assigned(user_id, Folder::Draft))?;
        info!("Saved draft {:?} for user {}", saved.id, user_id);
        Ok(saved)
    }

    /// Re-save a draft, taking the identifier from the record itself
    pub fn update_draft(&self, user_id: UserId, email: EmailRecord) -> Result<EmailRecord> {
        let Some(email_id) = email.id else {
            warn!("Rejected draft update without identifier for user {}", user_id);
            return Err(EmailError::MissingIdentifier);
        };
        self.update_draft_at(user_id, email_id, email)
    }

    /// Re-save the draft stored at (user_id, email_id)
    ///
    /// `email_id` is authoritative. A body identifier, if present, must match
    /// it. The record must still be in the draft folder, and so must the value
    /// it replaces.
    pub fn update_draft_at(
        &self,
        user_id: UserId,
        email_id: EmailId,
        mut email: EmailRecord,
    ) -> Result<EmailRecord> {
        if let Some(body_id) = email.id
            && body_id != email_id
        {
            return Err(EmailError::validation(format!(
                "email identifier {body_id} does not match {email_id}"
            )));
        }
        if !email.is_in(Folder::Draft) {
            warn!("Rejected update of email {} outside drafts", email_id);
            return Err(EmailError::invalid_folder(Folder::Draft, email.folder));
        }

        self.require_existing(user_id, email_id, &[Folder::Draft])?;

        email.id = Some(email_id);
        email.user_id = Some(user_id);
        let saved = self.store.upsert_email(email)?;
        info!("Updated draft {} for user {}", email_id, user_id);
        Ok(saved)
    }

    /// Send a record: stage it in the outbox, then mark it sent
    ///
    /// Both writes land under the same identifier. If the process stops
    /// between them the record stays discoverable in the outbox and
    /// [`EmailService::resume_outbox`] or a repeated send finishes it.
    /// A record with an identifier must be one of the user's drafts or a
    /// staged send.
    pub fn send(&self, user_id: UserId, email: EmailRecord) -> Result<SendResult> {
        let outcome = match email.id {
            Some(email_id) => {
                self.require_existing(user_id, email_id, &[Folder::Draft, Folder::Outbox])?;
                SaveOutcome::Updated
            }
            None => SaveOutcome::Created,
        };

        let staged = self
            .store
            .upsert_email(email.assigned(user_id, Folder::Outbox))?;
        info!("[SEND] Sending email {:?} for user {}", staged.id, user_id);

        let sent = self.finish_send(user_id, staged)?;
        Ok(SendResult {
            email: sent,
            outcome,
        })
    }

    /// Complete every send for `user_id` that stopped after its outbox write
    ///
    /// Returns the records moved to the sent folder.
    pub fn resume_outbox(&self, user_id: UserId) -> Result<Vec<EmailRecord>> {
        let stuck = self.store.list_emails_by_folder(user_id, Folder::Outbox)?;
        if stuck.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "[SEND] Resuming {} outbox email(s) for user {}",
            stuck.len(),
            user_id
        );

        stuck
            .into_iter()
            .map(|email| self.finish_send(user_id, email))
            .collect()
    }

    /// Require a record at (user_id, email_id) sitting in one of `allowed`
    fn require_existing(
        &self,
        user_id: UserId,
        email_id: EmailId,
        allowed: &[Folder],
    ) -> Result<()> {
        let existing = self.get_by_id(user_id, email_id)?;
        if !allowed.iter().any(|folder| existing.is_in(*folder)) {
            warn!(
                "Rejected change to email {} already in {:?}",
                email_id, existing.folder
            );
            return Err(EmailError::invalid_folder(Folder::Draft, existing.folder));
        }
        Ok(())
    }

    fn finish_send(&self, user_id: UserId, staged: EmailRecord) -> Result<EmailRecord> {
        let sent = self
            .store
            .upsert_email(staged.assigned(user_id, Folder::Sent))?;
        info!("[SEND] Sent email {:?} for user {}", sent.id, user_id);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailAddress;
    use crate::storage::InMemoryEmailStore;

    fn make_service() -> (EmailService, Arc<InMemoryEmailStore>) {
        let store = Arc::new(InMemoryEmailStore::new());
        (EmailService::new(store.clone()), store)
    }

    fn make_test_email(subject: &str) -> EmailRecord {
        EmailRecord::builder()
            .sender(EmailAddress::with_name("John Doe", "me@mail.com"))
            .recipients(vec![
                EmailAddress::with_name("Jane Doe", "abc@mail.com"),
                EmailAddress::new("def@mail.com"),
            ])
            .carbon_copies(vec![EmailAddress::new("uvw@mail.com")])
            .subject(subject)
            .body("Just testing if I can save this")
            .build()
    }

    #[test]
    fn test_create_draft_forces_owner_and_folder() {
        let (service, _) = make_service();
        let mut email = make_test_email("Test");
        email.user_id = Some(UserId(7));
        email.folder = Some(Folder::Inbox);

        let saved = service.create_draft(UserId(100), email).unwrap();

        assert!(saved.id.is_some());
        assert_eq!(saved.user_id, Some(UserId(100)));
        assert_eq!(saved.folder, Some(Folder::Draft));
        assert!(service.get_inbox(UserId(100)).unwrap().is_empty());
    }

    #[test]
    fn test_get_by_id_not_found() {
        let (service, _) = make_service();
        let saved = service.create_draft(UserId(1), make_test_email("Test")).unwrap();
        let id = saved.id.unwrap();

        let err = service.get_by_id(UserId(2), id).unwrap_err();
        assert!(err.is_not_found());
        assert!(service.get_by_id(UserId(1), EmailId(999)).unwrap_err().is_not_found());
        assert_eq!(service.get_by_id(UserId(1), id).unwrap(), saved);
    }

    #[test]
    fn test_update_draft_requires_id() {
        let (service, _) = make_service();
        let email = make_test_email("Test").assigned(UserId(1), Folder::Draft);

        let err = service.update_draft(UserId(1), email).unwrap_err();
        assert!(matches!(err, EmailError::MissingIdentifier));
    }

    #[test]
    fn test_update_draft_requires_draft_folder() {
        let (service, _) = make_service();
        let mut saved = service.create_draft(UserId(1), make_test_email("Test")).unwrap();
        saved.folder = Some(Folder::Sent);

        let err = service.update_draft(UserId(1), saved).unwrap_err();
        assert!(matches!(err, EmailError::InvalidFolder { .. }));
    }

    #[test]
    fn test_update_draft_round_trips_fields() {
        let (service, _) = make_service();
        let mut saved = service.create_draft(UserId(1), make_test_email("Test")).unwrap();
        saved.subject = "Edited".to_string();
        saved.blind_carbon_copies = vec![EmailAddress::new("hidden@mail.com")];

        let updated = service.update_draft(UserId(1), saved.clone()).unwrap();

        assert_eq!(updated, saved);
        assert_eq!(service.get_by_id(UserId(1), saved.id.unwrap()).unwrap(), saved);
    }

    #[test]
    fn test_update_draft_at_uses_explicit_id() {
        let (service, _) = make_service();
        let saved = service.create_draft(UserId(1), make_test_email("Test")).unwrap();
        let id = saved.id.unwrap();

        let mut body = saved.clone();
        body.id = None;
        body.subject = "Edited".to_string();
        let updated = service.update_draft_at(UserId(1), id, body).unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.subject, "Edited");
    }

    #[test]
    fn test_update_draft_at_rejects_mismatched_id() {
        let (service, _) = make_service();
        let first = service.create_draft(UserId(1), make_test_email("a")).unwrap();
        let second = service.create_draft(UserId(1), make_test_email("b")).unwrap();

        let err = service
            .update_draft_at(UserId(1), first.id.unwrap(), second)
            .unwrap_err();
        assert!(matches!(err, EmailError::Validation(_)));
    }

    #[test]
    fn test_update_draft_of_other_users_email_not_found() {
        let (service, _) = make_service();
        let saved = service.create_draft(UserId(1), make_test_email("Test")).unwrap();

        let err = service.update_draft(UserId(2), saved).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_draft_cannot_reopen_sent_email() {
        let (service, _) = make_service();
        let sent = service.send(UserId(1), make_test_email("Test")).unwrap().email;

        let mut reopened = sent.clone();
        reopened.folder = Some(Folder::Draft);
        let err = service.update_draft(UserId(1), reopened).unwrap_err();

        assert!(matches!(err, EmailError::InvalidFolder { .. }));
        assert_eq!(service.get_by_id(UserId(1), sent.id.unwrap()).unwrap(), sent);
    }

    #[test]
    fn test_send_new_email() {
        let (service, store) = make_service();

        let result = service.send(UserId(1), make_test_email("Test")).unwrap();

        assert_eq!(result.outcome, SaveOutcome::Created);
        assert_eq!(result.outcome.status_code(), 201);
        assert_eq!(result.email.folder, Some(Folder::Sent));
        assert!(result.email.id.is_some());
        assert!(store
            .list_emails_by_folder(UserId(1), Folder::Outbox)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_send_existing_draft_reuses_id() {
        let (service, store) = make_service();
        let draft = service.create_draft(UserId(1), make_test_email("Test")).unwrap();

        let result = service.send(UserId(1), draft.clone()).unwrap();

        assert_eq!(result.outcome, SaveOutcome::Updated);
        assert_eq!(result.outcome.status_code(), 200);
        assert_eq!(result.email.id, draft.id);
        assert_eq!(store.count_emails(UserId(1)).unwrap(), 1);
        assert!(service
            .store()
            .list_emails_by_folder(UserId(1), Folder::Draft)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_create_draft_with_other_users_id_not_found() {
        let (service, store) = make_service();
        let owned = service.create_draft(UserId(1), make_test_email("A")).unwrap();

        let mut foreign = make_test_email("B");
        foreign.id = owned.id;
        let err = service.create_draft(UserId(2), foreign).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.count_emails(UserId(2)).unwrap(), 0);
        assert_eq!(service.get_by_id(UserId(1), owned.id.unwrap()).unwrap(), owned);
    }

    #[test]
    fn test_create_draft_cannot_reopen_sent_email() {
        let (service, _) = make_service();
        let sent = service.send(UserId(1), make_test_email("Test")).unwrap().email;

        let err = service.create_draft(UserId(1), sent.clone()).unwrap_err();

        assert!(matches!(err, EmailError::InvalidFolder { .. }));
        assert_eq!(service.get_by_id(UserId(1), sent.id.unwrap()).unwrap(), sent);
    }

    #[test]
    fn test_send_with_other_users_id_not_found() {
        let (service, store) = make_service();
        let owned = service.create_draft(UserId(1), make_test_email("A")).unwrap();

        let mut foreign = make_test_email("B");
        foreign.id = owned.id;
        let err = service.send(UserId(3), foreign).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.count_emails(UserId(3)).unwrap(), 0);
        assert!(service.get_by_id(UserId(1), owned.id.unwrap()).unwrap().is_in(Folder::Draft));
    }

    #[test]
    fn test_send_cannot_move_inbox_email() {
        let (service, store) = make_service();
        let inbound = store
            .upsert_email(make_test_email("Inbound").assigned(UserId(1), Folder::Inbox))
            .unwrap();

        let err = service.send(UserId(1), inbound.clone()).unwrap_err();

        assert!(matches!(err, EmailError::InvalidFolder { .. }));
        assert_eq!(service.get_inbox(UserId(1)).unwrap(), vec![inbound]);
    }

    #[test]
    fn test_send_cannot_resend_sent_email() {
        let (service, _) = make_service();
        let sent = service.send(UserId(1), make_test_email("Test")).unwrap().email;

        let err = service.send(UserId(1), sent).unwrap_err();
        assert!(matches!(err, EmailError::InvalidFolder { .. }));
    }

    #[test]
    fn test_resume_outbox_completes_staged_sends() {
        let (service, store) = make_service();
        // Simulate a send interrupted after its staging write
        let staged = store
            .upsert_email(make_test_email("Stuck").assigned(UserId(1), Folder::Outbox))
            .unwrap();

        let resumed = service.resume_outbox(UserId(1)).unwrap();

        assert_eq!(resumed.len(), 1);
        assert_eq!(resumed[0].id, staged.id);
        assert_eq!(resumed[0].folder, Some(Folder::Sent));
        assert!(service.resume_outbox(UserId(1)).unwrap().is_empty());
    }
}
