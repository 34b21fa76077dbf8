use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Cursor;

/// Schema set of strings: deduplicated, iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringSet(BTreeSet<String>);

impl StringSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The set's members as schema list values.
    pub fn list(&self) -> Vec<serde_json::Value> {
        self.0
            .iter()
            .map(|v| serde_json::Value::String(v.clone()))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Canary script bundle as uploaded to CloudWatch Synthetics.
#[derive(Debug, Clone)]
pub struct CanaryCode {
    pub location: String,
    pub bytes: Vec<u8>,
}

impl CanaryCode {
    pub fn new(location: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            location: location.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 列出 zip 內的檔案名稱
    pub fn entries(&self) -> zip::result::ZipResult<Vec<String>> {
        let archive = zip::ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        Ok(archive.file_names().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_set_dedupes_and_sorts() {
        let set: StringSet = ["subnet-b", "subnet-a", "subnet-b"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["subnet-a", "subnet-b"]);
        assert!(set.contains("subnet-a"));
    }

    #[test]
    fn test_string_set_serializes_as_list() {
        let set: StringSet = ["sg-2", "sg-1"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["sg-1","sg-2"]"#);

        let back: StringSet = serde_json::from_str(r#"["sg-1","sg-1"]"#).unwrap();
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_canary_code_rejects_non_zip() {
        let code = CanaryCode::new("inline", b"exports.handler = async () => {}".to_vec());
        assert!(code.entries().is_err());
    }
}
