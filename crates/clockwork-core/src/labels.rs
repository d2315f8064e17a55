//! Saved countdown label names, stored under `timerLabels`.
//!
//! Labels exist independently of any countdown; pairing one with the
//! countdown is left to the presentation layer.

use std::sync::Arc;

use tracing::debug;

use crate::error::ValidationError;
use crate::storage::{keys, Persistence};

#[derive(Debug)]
pub struct TimerLabels {
    names: Vec<String>,
    persistence: Arc<Persistence>,
}

impl TimerLabels {
    pub fn load(persistence: Arc<Persistence>) -> Self {
        let stored: Vec<String> = persistence.load(keys::TIMER_LABELS).unwrap_or_default();
        let mut names: Vec<String> = Vec::with_capacity(stored.len());
        for name in stored {
            let name = name.trim().to_string();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        Self { names, persistence }
    }

    pub fn list(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name.trim())
    }

    /// Add a label. Returns the stored (trimmed) name.
    pub fn add(&mut self, name: &str) -> Result<String, ValidationError> {
        let name = Self::validate(name)?;
        if self.contains(&name) {
            return Err(ValidationError::DuplicateLabel(name));
        }
        self.names.push(name.clone());
        self.persist();
        Ok(name)
    }

    /// Rename in place. Returns `Ok(false)` if `old` does not exist.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<bool, ValidationError> {
        let new = Self::validate(new)?;
        let Some(index) = self.names.iter().position(|n| n == old.trim()) else {
            return Ok(false);
        };
        if self.names[index] == new {
            return Ok(true);
        }
        if self.contains(&new) {
            return Err(ValidationError::DuplicateLabel(new));
        }
        debug!(from = %self.names[index], to = %new, "label renamed");
        self.names[index] = new;
        self.persist();
        Ok(true)
    }

    /// Remove a label. Unknown names are a no-op.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name.trim());
        let removed = self.names.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    fn validate(name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        Ok(name.to_string())
    }

    fn persist(&self) {
        self.persistence.save(keys::TIMER_LABELS, &self.names);
    }
}
