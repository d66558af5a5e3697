use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::FailurePolicy;
use crate::contact::ContactTemplate;
use crate::profile::{DetailDefaults, PhotoFallback, DEFAULT_PHOTO_TEMPLATE};
use crate::queue::RefillOrder;
use crate::visible::DEFAULT_SLOTS;
use crate::{FeedError, Result};

pub const DEFAULT_INDEX_URL: &str = "http://localhost:8080/profiles/index.json";
pub const DEFAULT_DETAIL_URL: &str = "http://localhost:8080/profiles/";
pub const DEFAULT_IDENTITY_FILE: &str = "identity.json";

/// Settings of a feed session. Every field is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub index_url: String,
    /// Details are fetched from `<detail_url>/<id>`.
    pub detail_url: String,
    pub visible_slots: usize,
    pub refill_order: RefillOrder,
    /// Fixed seed for the shuffle, mostly useful for reproducing a feed.
    pub seed: Option<u64>,
    pub photo_template: String,
    pub failure_policy: FailurePolicy,
    pub detail_defaults: DetailDefaults,
    pub identity_path: PathBuf,
    pub contact: ContactTemplate,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_owned(),
            detail_url: DEFAULT_DETAIL_URL.to_owned(),
            visible_slots: DEFAULT_SLOTS,
            refill_order: RefillOrder::default(),
            seed: None,
            photo_template: DEFAULT_PHOTO_TEMPLATE.to_owned(),
            failure_policy: FailurePolicy::default(),
            detail_defaults: DetailDefaults::default(),
            identity_path: PathBuf::from(DEFAULT_IDENTITY_FILE),
            contact: ContactTemplate::default(),
        }
    }
}

impl FeedConfig {
    /// Reads a JSON config file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: FeedConfig =
            serde_json::from_str(&content).map_err(|err| {
                FeedError::Config(format!(
                    "{}: {}",
                    path.as_ref().display(),
                    err
                ))
            })?;
        config.validate()?;
        log::debug!("config: loaded {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.visible_slots == 0 {
            return Err(FeedError::Config(
                "visible_slots must be at least 1".to_owned(),
            ));
        }
        if self.contact.domain.trim().is_empty() {
            return Err(FeedError::Config("contact domain is empty".to_owned()));
        }
        self.index_url()?;
        self.detail_url()?;
        self.photos()?;
        Ok(())
    }

    pub fn index_url(&self) -> Result<Url> {
        Self::parse_url("index_url", &self.index_url)
    }

    pub fn detail_url(&self) -> Result<Url> {
        Self::parse_url("detail_url", &self.detail_url)
    }

    pub fn photos(&self) -> Result<PhotoFallback> {
        PhotoFallback::new(self.photo_template.clone())
    }

    fn parse_url(field: &str, raw: &str) -> Result<Url> {
        Url::parse(raw).map_err(|err| {
            FeedError::Config(format!("{} `{}`: {}", field, raw, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = FeedConfig::default();
        config.validate().unwrap();
        assert_eq!(config.visible_slots, 5);
        assert_eq!(config.failure_policy, FailurePolicy::Never);
        assert_eq!(config.contact.domain, "example.com");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new("config_test").unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(
            &path,
            r#"{
                "index_url": "https://profiles.test/index.json",
                "refill_order": "sequential",
                "failure_policy": { "expire": { "seconds": 30 } },
                "contact": { "domain": "mail.test" }
            }"#,
        )
        .unwrap();

        let config = FeedConfig::load(&path).unwrap();
        assert_eq!(config.index_url, "https://profiles.test/index.json");
        assert_eq!(config.detail_url, DEFAULT_DETAIL_URL);
        assert_eq!(config.refill_order, RefillOrder::Sequential);
        assert_eq!(
            config.failure_policy,
            FailurePolicy::Expire { seconds: 30 }
        );
        assert_eq!(config.contact.domain, "mail.test");
        assert_eq!(config.contact.greeting, ContactTemplate::default().greeting);
    }

    #[rstest]
    #[case(r#"{"visible_slots": 0}"#)]
    #[case(r#"{"index_url": "not a url"}"#)]
    #[case(r#"{"photo_template": "https://img.test/static.png"}"#)]
    #[case(r#"{"contact": {"domain": " "}}"#)]
    #[case(r#"{"visible_slots": "five"}"#)]
    fn invalid_files_are_rejected(#[case] content: &str) {
        let dir = TempDir::new("config_test").unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, content).unwrap();
        assert!(matches!(FeedConfig::load(&path), Err(FeedError::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new("config_test").unwrap();
        let result = FeedConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(FeedError::Io(_))));
    }
}
