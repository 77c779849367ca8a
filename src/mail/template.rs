//! Mail body templates.
//!
//! Templates are HTML files named after the message type
//! (`Welcome.html`, ...) in a configured directory. `{{Key}}` markers are
//! replaced with placeholder values; markers without a value are left as is.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{MessageType, Placeholders};

/// Template lookup or read error.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory of mail templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Template directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the template for a message type.
    pub fn path_for(&self, message_type: MessageType) -> PathBuf {
        self.root.join(message_type.template_name())
    }

    /// Load and fill the template for a message type.
    pub async fn render(
        &self,
        message_type: MessageType,
        placeholders: &Placeholders,
    ) -> Result<String, TemplateError> {
        let path = self.path_for(message_type);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound(path));
            }
            Err(source) => return Err(TemplateError::Io { path, source }),
        };
        Ok(fill_placeholders(&body, placeholders))
    }
}

/// Replace every `{{Key}}` in `template` with its value.
pub fn fill_placeholders(template: &str, placeholders: &Placeholders) -> String {
    placeholders
        .iter()
        .fold(template.to_string(), |body, (key, value)| {
            body.replace(&format!("{{{{{key}}}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(pairs: &[(&str, &str)]) -> Placeholders {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_placeholders() {
        let body = fill_placeholders(
            "<p>Hello {{FirstName}} {{LastName}}, {{FirstName}}!</p>",
            &placeholders(&[("FirstName", "Ada"), ("LastName", "Lovelace")]),
        );
        assert_eq!(body, "<p>Hello Ada Lovelace, Ada!</p>");
    }

    #[test]
    fn test_unknown_placeholder_left_untouched() {
        let body = fill_placeholders("Hi {{Nickname}}", &placeholders(&[("FirstName", "Ada")]));
        assert_eq!(body, "Hi {{Nickname}}");
    }

    #[tokio::test]
    async fn test_render_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Welcome.html"), "Welcome {{FirstName}}").unwrap();

        let store = TemplateStore::new(dir.path());
        let body = store
            .render(MessageType::Welcome, &placeholders(&[("FirstName", "Ada")]))
            .await
            .unwrap();
        assert_eq!(body, "Welcome Ada");
    }

    #[tokio::test]
    async fn test_render_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        let err = store
            .render(MessageType::PasswordReset, &Placeholders::new())
            .await
            .unwrap_err();
        match err {
            TemplateError::NotFound(path) => assert!(path.ends_with("PasswordReset.html")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
