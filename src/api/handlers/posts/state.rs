//! Media upload configuration shared by the post handlers.

#[derive(Clone, Debug)]
pub struct MediaConfig {
    base_url: String,
    upload_dir: String,
}

impl MediaConfig {
    #[must_use]
    pub fn new(base_url: String, upload_dir: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_dir,
        }
    }

    #[must_use]
    pub fn upload_dir(&self) -> &str {
        &self.upload_dir
    }

    /// Public URL for a stored media file.
    #[must_use]
    pub fn media_url(&self, filename: &str) -> String {
        format!("{}/uploads/{filename}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::MediaConfig;

    #[test]
    fn media_url_trims_trailing_slash() {
        let config = MediaConfig::new("http://localhost:8080/".to_string(), "uploads".to_string());
        assert_eq!(
            config.media_url("1700000000000-cat.png"),
            "http://localhost:8080/uploads/1700000000000-cat.png"
        );
        assert_eq!(config.upload_dir(), "uploads");
    }
}
