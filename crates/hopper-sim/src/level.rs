//! Level data: spawn point, body size, static platforms and an optional goal.
//!
//! Levels are plain JSON documents:
//!
//! ```json
//! {
//!   "name": "tutorial",
//!   "spawn": {"x": 0.0, "y": 0.0},
//!   "size": "default",
//!   "platforms": [{"x": 0.0, "y": 100.0, "width": 200.0, "height": 20.0}],
//!   "goal": {"x": 180.0, "y": 40.0, "width": 20.0, "height": 60.0}
//! }
//! ```
//!
//! The physics core assumes well-formed input and never checks it, so
//! [`Level::validate`] is the gate every level passes through before it is
//! simulated.

use std::path::Path;

use hopper_physics::prelude::*;
use serde::{Deserialize, Serialize};

use crate::hash::StateHasher;

/// Maximum level name length in characters, after trimming.
pub const MAX_NAME_LEN: usize = 50;

/// Errors produced when loading or validating a level.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// The name was empty after trimming whitespace.
    #[error("level name cannot be empty")]
    EmptyName,

    /// The name was longer than [`MAX_NAME_LEN`] characters after trimming.
    #[error("level name must be 50 characters or less, got {len}")]
    NameTooLong { len: usize },

    /// The spawn point had a NaN or infinite coordinate.
    #[error("spawn point ({x}, {y}) must be finite")]
    NonFiniteSpawn { x: f64, y: f64 },

    /// A platform had a non-finite coordinate or a non-positive extent.
    #[error("platform {index} is malformed: {rect:?}")]
    MalformedPlatform { index: usize, rect: Aabb },

    /// The goal had a non-finite coordinate or a non-positive extent.
    #[error("goal is malformed: {rect:?}")]
    MalformedGoal { rect: Aabb },

    /// The JSON document could not be parsed.
    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),

    /// The level file could not be read.
    #[error("failed to read level file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A playable level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Display name, 1 to 50 characters once trimmed.
    pub name: String,
    /// Top-left corner of the body at the start of a run.
    pub spawn: Point,
    /// Body size category for this level.
    #[serde(default)]
    pub size: Size,
    /// Static obstacles, in the order they are handed to the resolver.
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Finish area. Overlapping it ends a timed run.
    #[serde(default)]
    pub goal: Option<Aabb>,
}

impl Level {
    /// Parse a level from JSON. The result is not validated.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read, parse and validate a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let level = Self::from_json_str(&json)?;
        level.validate()?;
        tracing::debug!(
            name = %level.name,
            platforms = level.platforms.len(),
            "loaded level"
        );
        Ok(level)
    }

    /// Check the level against every precondition the physics core assumes.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking the name, then the spawn
    /// point, then platforms in order, then the goal.
    pub fn validate(&self) -> Result<(), LevelError> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(LevelError::EmptyName);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LEN {
            return Err(LevelError::NameTooLong { len });
        }

        if !(self.spawn.x.is_finite() && self.spawn.y.is_finite()) {
            return Err(LevelError::NonFiniteSpawn {
                x: self.spawn.x,
                y: self.spawn.y,
            });
        }

        if let Some(index) = self.platforms.iter().position(|p| !p.is_well_formed()) {
            return Err(LevelError::MalformedPlatform {
                index,
                rect: self.platforms[index].bounds(),
            });
        }

        if let Some(goal) = self.goal {
            if !goal.is_well_formed() {
                return Err(LevelError::MalformedGoal { rect: goal });
            }
        }
        Ok(())
    }

    /// A body at the spawn point, at rest, sized for this level.
    pub fn spawn_body(&self) -> Body {
        Body::new(self.spawn.x, self.spawn.y, self.size)
    }

    /// BLAKE3 hex digest of everything that affects simulation: spawn, size,
    /// platforms (in order) and goal. The name is included so two identical
    /// layouts under different names are told apart.
    pub fn content_hash(&self) -> String {
        let mut hasher = StateHasher::new("hopper.level.v1");
        hasher
            .str(&self.name)
            .f64(self.spawn.x)
            .f64(self.spawn.y)
            .f64(self.size.pixels())
            .u64(self.platforms.len() as u64);
        for platform in &self.platforms {
            hasher.rect(platform);
        }
        match &self.goal {
            Some(goal) => hasher.bool(true).rect(goal),
            None => hasher.bool(false),
        };
        hasher.finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
