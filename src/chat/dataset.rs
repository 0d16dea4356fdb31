//! Static Q&A dataset loading.
//!
//! The dataset is a JSON array of records, loaded once at startup and never
//! mutated. A record's position in the file is its identity for the lifetime
//! of the process; the embedding index is row-aligned with it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ChatError;

/// One Q&A dataset row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRecord {
    /// Category label, e.g. "marketing"; matched case-insensitively
    pub field: String,
    pub question: String,
    /// Comma-separated keyword list used for the score boost
    pub keywords: String,
    pub answer: String,
}

impl QaRecord {
    /// Text the record's embedding is computed from
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.question, self.keywords)
    }
}

/// Load the dataset from a JSON file, preserving file order.
pub fn load_dataset(path: &Path) -> Result<Vec<QaRecord>, ChatError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ChatError::Dataset(format!("{}: {}", path.display(), e)))?;

    let records: Vec<QaRecord> = serde_json::from_str(&content)
        .map_err(|e| ChatError::Dataset(format!("{}: {}", path.display(), e)))?;

    if records.is_empty() {
        return Err(ChatError::Dataset(format!(
            "{}: dataset contains no records",
            path.display()
        )));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_preserves_order() {
        let file = write_dataset(
            r#"[
                {"field": "marketing", "question": "q1", "keywords": "a, b", "answer": "first"},
                {"field": "finance", "question": "q2", "keywords": "c", "answer": "second"}
            ]"#,
        );
        let records = load_dataset(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].answer, "first");
        assert_eq!(records[1].answer, "second");
        assert_eq!(records[0].combined_text(), "q1 a, b");
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_dataset(Path::new("/nonexistent/dataset.json")).unwrap_err();
        assert!(matches!(err, ChatError::Dataset(_)));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let file = write_dataset("{not json");
        assert!(load_dataset(file.path()).is_err());
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let file = write_dataset("[]");
        assert!(load_dataset(file.path()).is_err());
    }
}
