//! Favourites overlay
//!
//! Favourites are a user-maintained set of job identifiers kept in a small
//! JSON document next to the job store:
//!
//! ```json
//! {"favorites": ["12345", "67890"]}
//! ```
//!
//! The file is independent of the store. Ids that no longer appear in the
//! store are kept. Every change rewrites the whole file and there is no
//! locking, so concurrent writers resolve as last-writer-wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting favourites
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("Failed to access favorites file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to encode favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of toggling one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Set of favourite job identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSet {
    #[serde(default)]
    favorites: BTreeSet<String>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Identifiers in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.favorites.iter().map(String::as_str)
    }

    /// Adds the id if absent, removes it if present
    pub fn toggle(&mut self, id: &str) -> Toggled {
        if self.favorites.remove(id) {
            Toggled::Removed
        } else {
            self.favorites.insert(id.to_string());
            Toggled::Added
        }
    }

    /// Sets the favourite flag of one id explicitly
    ///
    /// Returns true if the set changed.
    pub fn set(&mut self, id: &str, favourite: bool) -> bool {
        if favourite {
            self.favorites.insert(id.to_string())
        } else {
            self.favorites.remove(id)
        }
    }

    /// Applies the flags of an edited table, returning the number of changes
    pub fn apply_edits<'a, I>(&mut self, edits: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        edits
            .into_iter()
            .filter(|&(id, favourite)| self.set(id, favourite))
            .count()
    }

    pub fn clear(&mut self) {
        self.favorites.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            favorites: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// The favourites document on disk
#[derive(Debug, Clone)]
pub struct FavoritesFile {
    path: PathBuf,
}

impl FavoritesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the favourites
    ///
    /// A missing file is an empty set. A file that cannot be parsed is
    /// logged and also treated as empty, so a hand-edited file never blocks
    /// the dashboard.
    pub fn load(&self) -> Result<FavoriteSet, FavoritesError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FavoriteSet::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        match serde_json::from_str(&text) {
            Ok(set) => Ok(set),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable favorites file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(FavoriteSet::new())
            }
        }
    }

    /// Loads the favourites, logging and discarding read failures
    pub fn load_or_default(&self) -> FavoriteSet {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            FavoriteSet::new()
        })
    }

    /// Overwrites the file with the given set
    pub fn save(&self, set: &FavoriteSet) -> Result<(), FavoritesError> {
        let json = serde_json::to_string_pretty(set)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        tracing::debug!(
            "Saved {} favorites to {}",
            set.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Toggles one id and saves the result
    pub fn toggle(&self, id: &str) -> Result<Toggled, FavoritesError> {
        let mut set = self.load()?;
        let toggled = set.toggle(id);
        self.save(&set)?;
        Ok(toggled)
    }

    /// Sets one id's flag and saves the result if it changed
    pub fn set(&self, id: &str, favourite: bool) -> Result<bool, FavoritesError> {
        self.apply_edits([(id, favourite)]).map(|changed| changed > 0)
    }

    /// Applies table edits and saves the result if anything changed
    pub fn apply_edits<'a, I>(&self, edits: I) -> Result<usize, FavoritesError>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut set = self.load()?;
        let changed = set.apply_edits(edits);
        if changed > 0 {
            self.save(&set)?;
        }
        Ok(changed)
    }

    /// Removes every favourite
    pub fn clear(&self) -> Result<(), FavoritesError> {
        self.save(&FavoriteSet::new())
    }

    fn io_error(&self, source: std::io::Error) -> FavoritesError {
        FavoritesError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
