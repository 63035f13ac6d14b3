//! File-backed call data.
//!
//! `JsonCallStore` serves `<data_dir>/<callId>.json` (a `CallDetails`
//! object) and `<data_dir>/<callId>.transcript.json` (a `CallTranscript`).
//! A call without a transcript file has no recording; it is not an error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use call_analyzer_core::{CallDataProvider, CallDetails, CallTranscript, CoreError, CoreResult};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct JsonCallStore {
    data_dir: PathBuf,
}

impl JsonCallStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, call_id: &str, suffix: &str) -> CoreResult<PathBuf> {
        // Ids name files directly.
        if call_id.is_empty()
            || call_id.contains(['/', '\\'])
            || call_id == "."
            || call_id == ".."
        {
            return Err(CoreError::validation(format!("invalid call id '{}'", call_id)));
        }
        Ok(self.data_dir.join(format!("{}{}", call_id, suffix)))
    }
}

/// Read and parse a JSON file; `Ok(None)` when it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> CoreResult<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::Io(e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CoreError::parse(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl CallDataProvider for JsonCallStore {
    async fn get_call_details(&self, call_id: &str) -> CoreResult<CallDetails> {
        let path = self.path_for(call_id, ".json")?;
        let mut details: CallDetails = read_json(&path)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("call {}", call_id)))?;
        if details.call_id.is_empty() {
            details.call_id = call_id.to_string();
        }
        Ok(details)
    }

    async fn get_call_transcript(&self, call_id: &str) -> CoreResult<CallTranscript> {
        let path = self.path_for(call_id, ".transcript.json")?;
        match read_json(&path).await? {
            Some(transcript) => Ok(transcript),
            None => {
                tracing::debug!(call_id, "no transcript file");
                Ok(CallTranscript::missing())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_reads_details_and_transcript() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "c1.json",
            r#"{"callId": "c1", "title": "Discovery", "date": "2024-05-01T16:00:00Z", "duration": 1800,
                "participants": [{"name": "Sarah Chen", "title": "AE", "affiliation": "internal"}]}"#,
        );
        write(
            dir.path(),
            "c1.transcript.json",
            r#"{"hasTranscript": true, "transcript": [
                {"speaker": "Sarah Chen", "sentences": [{"start": 0, "end": 2000, "text": "Hi all."}]}
            ]}"#,
        );
        let store = JsonCallStore::new(dir.path());

        let details = store.get_call_details("c1").await.unwrap();
        assert_eq!(details.title, "Discovery");
        assert_eq!(details.duration, 1800);
        assert_eq!(details.participants.len(), 1);

        let transcript = store.get_call_transcript("c1").await.unwrap();
        assert!(transcript.is_usable());
        assert_eq!(transcript.transcript[0].sentences[0].text, "Hi all.");
    }

    #[tokio::test]
    async fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "c2.json", r#"{"callId": "", "title": "No recording"}"#);
        let store = JsonCallStore::new(dir.path());

        assert_eq!(store.get_call_details("c2").await.unwrap().call_id, "c2");
        let transcript = store.get_call_transcript("c2").await.unwrap();
        assert!(!transcript.has_transcript);

        assert!(matches!(
            store.get_call_details("absent").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_and_unsafe_ids() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", "{not json");
        let store = JsonCallStore::new(dir.path());

        assert!(matches!(store.get_call_details("bad").await, Err(CoreError::Parse(_))));
        assert!(matches!(
            store.get_call_details("../etc/passwd").await,
            Err(CoreError::Validation(_))
        ));
    }
}
