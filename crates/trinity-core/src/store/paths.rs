//! Per-user path layout.
//!
//! ```text
//! users/{uid}/threads                      thread collection
//! users/{uid}/threads/{threadId}           one thread
//! users/{uid}/threads/{threadId}/messages  messages of a thread
//! users/{uid}/progress/v1                  progress document
//! users/{uid}/journal                      journal entries
//! ```

use crate::error::{Result, TrinityError};
use crate::session::Session;

pub fn user_root(session: &Session) -> String {
    format!("users/{}", session.uid)
}

pub fn threads(session: &Session) -> String {
    format!("{}/threads", user_root(session))
}

pub fn thread(session: &Session, thread_id: &str) -> String {
    format!("{}/{}", threads(session), thread_id)
}

pub fn messages(session: &Session, thread_id: &str) -> String {
    format!("{}/messages", thread(session, thread_id))
}

pub fn progress(session: &Session) -> String {
    format!("{}/progress/v1", user_root(session))
}

pub fn journal(session: &Session) -> String {
    format!("{}/journal", user_root(session))
}

fn segments(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(TrinityError::validation(format!("Malformed store path '{path}'")));
    }
    Ok(segments)
}

/// Validates a collection path (odd number of segments).
pub fn check_collection_path(path: &str) -> Result<()> {
    if segments(path)?.len() % 2 == 1 {
        Ok(())
    } else {
        Err(TrinityError::validation(format!("'{path}' is not a collection path")))
    }
}

/// Splits a document path into its collection path and document id.
pub fn split_document_path(path: &str) -> Result<(&str, &str)> {
    if segments(path)?.len() % 2 != 0 {
        return Err(TrinityError::validation(format!("'{path}' is not a document path")));
    }
    path.rsplit_once('/')
        .ok_or_else(|| TrinityError::validation(format!("'{path}' is not a document path")))
}

/// Splits a collection path into its parent document path and collection id.
///
/// Returns `None` as the parent for a root collection.
pub fn split_collection_path(path: &str) -> Result<(Option<&str>, &str)> {
    check_collection_path(path)?;
    Ok(match path.rsplit_once('/') {
        Some((parent, collection)) => (Some(parent), collection),
        None => (None, path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_scoped_by_uid() {
        let session = Session::new("u42", "x@y.z");
        assert_eq!(threads(&session), "users/u42/threads");
        assert_eq!(messages(&session, "t1"), "users/u42/threads/t1/messages");
        assert_eq!(progress(&session), "users/u42/progress/v1");
        assert_eq!(journal(&session), "users/u42/journal");
    }

    #[test]
    fn test_split_paths() {
        assert_eq!(
            split_document_path("users/u/threads/t1").unwrap(),
            ("users/u/threads", "t1")
        );
        assert!(split_document_path("users/u/threads").is_err());
        assert_eq!(
            split_collection_path("users/u/journal").unwrap(),
            (Some("users/u"), "journal")
        );
        assert_eq!(split_collection_path("users").unwrap(), (None, "users"));
        assert!(check_collection_path("users//journal").is_err());
    }
}
