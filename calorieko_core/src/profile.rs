//! User profile persistence with file locking.
//!
//! The profile written at the end of onboarding is saved atomically so a
//! crash mid-write never leaves a truncated file behind.

use crate::{BiometricProfile, Error, NutritionTarget, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Biometrics plus daily targets, as produced by onboarding
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub biometrics: BiometricProfile,
    pub targets: NutritionTarget,
}

impl UserProfile {
    /// Load a profile with shared locking
    ///
    /// Returns `None` if no profile has been saved yet. A corrupt file is
    /// logged and treated as missing so the user can onboard again.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!("No profile found at {:?}", path);
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => {
                tracing::debug!("Loaded profile from {:?}", path);
                Ok(Some(profile))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse profile {:?}: {}. Ignoring it.",
                    path,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Save the profile atomically: locked temp file, fsync, rename
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Other(format!("profile path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved profile to {:?}", path);
        Ok(())
    }
}
