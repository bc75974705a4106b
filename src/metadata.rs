use serde_json::Value;
use std::{fs, path::Path};

/// Parsed `modio.json` sidecar. The document is read once at construction
/// and never refreshed. A missing file, unparseable JSON, or a non-object
/// root all leave the document absent, and every lookup on an absent
/// document resolves to `None`, so callers degrade feature by feature
/// instead of failing hard.
#[derive(Debug, Default, Clone)]
pub struct ModioSidecar {
    doc: Option<Value>,
}

impl ModioSidecar {
    pub fn read(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => return Self { doc: None },
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(doc @ Value::Object(_)) => Self { doc: Some(doc) },
            Ok(_) | Err(_) => Self { doc: None },
        }
    }

    pub fn is_present(&self) -> bool {
        self.doc.is_some()
    }

    /// Descend `path` one object key at a time. Any miss along the way
    /// yields `None` rather than an error.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.doc.as_ref()?;
        for key in path {
            current = current.get(key)?;
        }
        Some(current)
    }

    /// String form of a leaf value. mod.io serves ids as JSON numbers, so
    /// numeric leaves render as their literal.
    pub fn lookup_string(&self, path: &[&str]) -> Option<String> {
        match self.lookup(path)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }

    /// Epoch-seconds leaf, served by mod.io as either a number or a numeric
    /// string depending on the endpoint that wrote the sidecar.
    pub fn lookup_epoch(&self, path: &[&str]) -> Option<i64> {
        match self.lookup(path)? {
            Value::Number(value) => value.as_i64(),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<String> {
        self.lookup_string(&["id"])
    }

    pub fn name(&self) -> Option<String> {
        self.lookup_string(&["name"])
    }

    pub fn date_added(&self) -> Option<i64> {
        self.lookup_epoch(&["modfile", "date_added"])
    }

    pub fn download_url(&self) -> Option<String> {
        self.lookup_string(&["modfile", "download", "binary_url"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sidecar_from(json: &str) -> ModioSidecar {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modio.json");
        fs::write(&path, json).unwrap();
        ModioSidecar::read(&path)
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let sidecar = ModioSidecar::read(&dir.path().join("modio.json"));
        assert!(!sidecar.is_present());
        assert_eq!(sidecar.id(), None);
    }

    #[test]
    fn garbage_is_absent() {
        assert!(!sidecar_from("not json at all").is_present());
    }

    #[test]
    fn non_object_root_is_absent() {
        assert!(!sidecar_from("[1, 2, 3]").is_present());
    }

    #[test]
    fn numeric_id_renders_as_string() {
        let sidecar = sidecar_from(r#"{"id":2053242,"name":"Sample"}"#);
        assert_eq!(sidecar.id(), Some("2053242".to_string()));
        assert_eq!(sidecar.name(), Some("Sample".to_string()));
    }

    #[test]
    fn date_added_parses_from_string_and_number() {
        let as_string = sidecar_from(r#"{"modfile":{"date_added":"1000"}}"#);
        assert_eq!(as_string.date_added(), Some(1000));

        let as_number = sidecar_from(r#"{"modfile":{"date_added":1000}}"#);
        assert_eq!(as_number.date_added(), Some(1000));
    }

    #[test]
    fn missing_nested_key_is_none() {
        let sidecar = sidecar_from(r#"{"modfile":{}}"#);
        assert_eq!(sidecar.date_added(), None);
        assert_eq!(sidecar.download_url(), None);
    }

    #[test]
    fn download_url_descends_three_levels() {
        let sidecar = sidecar_from(
            r#"{"modfile":{"download":{"binary_url":"https://modcdn.example/a.zip"}}}"#,
        );
        assert_eq!(
            sidecar.download_url(),
            Some("https://modcdn.example/a.zip".to_string())
        );
    }
}
