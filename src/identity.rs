use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{FeedError, Result};

/// The signed-in user, named as the sender of contact messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl AsRef<str>, email: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref().trim();
        let email = email.as_ref().trim();
        if name.is_empty() {
            return Err(FeedError::InvalidIdentity("name is empty".to_owned()));
        }
        if email.is_empty() {
            return Err(FeedError::InvalidIdentity("email is empty".to_owned()));
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }

    fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// Single-slot JSON file holding the local [`Identity`].
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored identity.
    ///
    /// A missing file means nobody signed in. An unreadable, corrupt or
    /// incomplete file is treated the same way, so the user is asked again.
    pub fn load(&self) -> Result<Option<Identity>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                log::warn!(
                    "identity: cannot read {} ({}), ignoring",
                    self.path.display(),
                    err
                );
                return Ok(None);
            }
        };

        match serde_json::from_slice::<Identity>(&bytes) {
            Ok(identity) if identity.is_valid() => Ok(Some(identity)),
            Ok(_) => {
                log::warn!(
                    "identity: {} holds empty fields, ignoring",
                    self.path.display()
                );
                Ok(None)
            }
            Err(err) => {
                log::warn!(
                    "identity: {} is not readable ({}), ignoring",
                    self.path.display(),
                    err
                );
                Ok(None)
            }
        }
    }

    /// Write the identity to a temporary sibling file and move it over
    /// the slot.
    pub fn save(&self, identity: &Identity) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(10)
            .collect();
        let tmp = dir.join(format!(".identity-{}.tmp", suffix));

        let data = serde_json::to_vec_pretty(identity)?;
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&data)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        log::info!("identity: saved to {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
