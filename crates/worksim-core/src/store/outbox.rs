use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::DraftStore;
use crate::error::{FieldError, ValidationError};
use crate::models::{DraftEmail, SentEmail};

fn looks_like_address(address: &str) -> bool {
    match address.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn validate(draft: &DraftEmail) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.recipients.is_empty() {
        errors.push(FieldError {
            field: "recipients",
            message: "Penerima wajib diisi".to_string(),
        });
    }

    let invalid = |list: &[String], field: &'static str, errors: &mut Vec<FieldError>| {
        for address in list.iter().filter(|a| !looks_like_address(a)) {
            errors.push(FieldError {
                field,
                message: format!("Alamat email tidak valid: {}", address),
            });
        }
    };
    invalid(&draft.recipients, "recipients", &mut errors);
    invalid(&draft.cc, "cc", &mut errors);

    errors
}

/// Send a stored draft: validate it, copy it into `sent` and delete it from
/// `drafts`. A missing draft is `Ok(None)`; an invalid one stays in place.
pub fn send_draft<D, S>(
    drafts: &mut D,
    sent: &mut S,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Option<SentEmail>, ValidationError>
where
    D: DraftStore<DraftEmail> + ?Sized,
    S: DraftStore<SentEmail> + ?Sized,
{
    let Some(draft) = drafts.get(id) else {
        return Ok(None);
    };

    let errors = validate(&draft);
    if !errors.is_empty() {
        return Err(ValidationError::Fields(errors));
    }

    let sent_id = sent.save(SentEmail::from_draft(draft, now))?;
    if let Err(e) = drafts.delete(id) {
        // A failed move leaves no sent copy
        if let Err(rollback) = sent.delete(&sent_id) {
            warn!(sent = %sent_id, "failed to roll back sent email: {}", rollback);
        }
        return Err(e.into());
    }
    info!(draft = %id, sent = %sent_id, "draft sent");

    Ok(sent.get(&sent_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentBlock;
    use crate::error::StoreError;
    use crate::models::DraftEmailPatch;
    use crate::store::MemoryStore;
    use std::path::PathBuf;

    /// Draft store whose deletes always fail
    struct StuckDrafts(MemoryStore<DraftEmail>);

    impl DraftStore<DraftEmail> for StuckDrafts {
        fn save(&mut self, record: DraftEmail) -> Result<String, StoreError> {
            self.0.save(record)
        }

        fn update(
            &mut self,
            id: &str,
            patch: DraftEmailPatch,
        ) -> Result<Option<DraftEmail>, StoreError> {
            self.0.update(id, patch)
        }

        fn get(&self, id: &str) -> Option<DraftEmail> {
            self.0.get(id)
        }

        fn delete(&mut self, _id: &str) -> Result<bool, StoreError> {
            Err(StoreError::Write {
                path: PathBuf::from("drafts.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn list(&self) -> Vec<DraftEmail> {
            self.0.list()
        }
    }

    fn draft(recipients: &[&str]) -> DraftEmail {
        DraftEmail::new(
            "Usulan kegiatan",
            recipients.iter().map(|r| r.to_string()).collect(),
            vec![ContentBlock::paragraph("Berikut usulan saya.")],
        )
    }

    #[test]
    fn test_send_moves_draft_to_sent() {
        let mut drafts = MemoryStore::<DraftEmail>::new();
        let mut sent = MemoryStore::<SentEmail>::new();
        let id = drafts.save(draft(&["hr@contoh.id"])).unwrap();

        let email = send_draft(&mut drafts, &mut sent, &id, Utc::now())
            .unwrap()
            .unwrap();

        assert!(email.id.starts_with("sent-"));
        assert_eq!(email.subject, "Usulan kegiatan");
        assert!(drafts.get(&id).is_none());
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn test_send_missing_draft_is_a_miss() {
        let mut drafts = MemoryStore::<DraftEmail>::new();
        let mut sent = MemoryStore::<SentEmail>::new();
        assert!(send_draft(&mut drafts, &mut sent, "draft-404", Utc::now())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_recipients_keep_draft() {
        let mut drafts = MemoryStore::<DraftEmail>::new();
        let mut sent = MemoryStore::<SentEmail>::new();

        let empty = drafts.save(draft(&[])).unwrap();
        let err = send_draft(&mut drafts, &mut sent, &empty, Utc::now()).unwrap_err();
        assert_eq!(err.fields().len(), 1);
        assert_eq!(err.fields()[0].field, "recipients");

        let bad = drafts.save(draft(&["hr@contoh.id", "bukan-alamat"])).unwrap();
        let err = send_draft(&mut drafts, &mut sent, &bad, Utc::now()).unwrap_err();
        assert!(err.fields()[0].message.contains("bukan-alamat"));

        assert!(drafts.get(&empty).is_some());
        assert!(drafts.get(&bad).is_some());
        assert!(sent.is_empty());
    }

    #[test]
    fn test_failed_draft_delete_rolls_back_sent_copy() {
        let mut drafts = StuckDrafts(MemoryStore::new());
        let mut sent = MemoryStore::<SentEmail>::new();
        let id = drafts.save(draft(&["hr@contoh.id"])).unwrap();

        for _ in 0..2 {
            let err = send_draft(&mut drafts, &mut sent, &id, Utc::now()).unwrap_err();
            assert!(matches!(err, ValidationError::Store(_)));
        }

        assert!(sent.is_empty());
        assert!(drafts.get(&id).is_some());
    }

    #[test]
    fn test_address_shape() {
        assert!(looks_like_address("a@b"));
        assert!(looks_like_address(" tim@contoh.id "));
        assert!(!looks_like_address("@contoh.id"));
        assert!(!looks_like_address("tim@"));
        assert!(!looks_like_address("a@b@c"));
    }
}
