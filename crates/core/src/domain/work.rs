// Work Domain Model: data exchanged between stages, results and per-stage state

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{DomainError, Result};
use super::image::{BlurLevel, ImageLocator};

/// Work data key holding an image locator
pub const KEY_IMAGE_URI: &str = "KEY_IMAGE_URI";

/// Work data key holding the blur level
pub const KEY_BLUR_LEVEL: &str = "KEY_BLUR_LEVEL";

/// Work request ID (UUID v4)
pub type WorkId = String;

/// Key/value mapping handed to a stage as input and returned as output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkData(Map<String, Value>);

impl WorkData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Input data for the blur stage
    pub fn for_blur(image: &ImageLocator, level: BlurLevel) -> Self {
        Self::new()
            .with(KEY_IMAGE_URI, image.as_str())
            .with(KEY_BLUR_LEVEL, i64::from(level))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Integer value, or `default` when the key is absent or not an integer
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.0.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    /// Image locator under KEY_IMAGE_URI, if present and non-blank
    pub fn image_uri(&self) -> Option<ImageLocator> {
        self.get_string(KEY_IMAGE_URI)
            .and_then(|s| ImageLocator::parse(s).ok())
    }

    /// Blur level under KEY_BLUR_LEVEL (default 1, also for non-integers).
    /// Fails only for values below 1.
    pub fn blur_level(&self) -> Result<BlurLevel> {
        BlurLevel::new(self.get_int(KEY_BLUR_LEVEL, 1))
    }

    /// Overlay `other` on top of `self`; keys from `other` win
    pub fn merged(mut self, other: &WorkData) -> Self {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }
}

/// Outcome reported by a single stage
#[derive(Debug, Clone, PartialEq)]
pub enum WorkResult {
    Success(WorkData),
    Failure,
}

impl WorkResult {
    pub fn success() -> Self {
        WorkResult::Success(WorkData::new())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkResult::Success(_))
    }

    pub fn output(&self) -> Option<&WorkData> {
        match self {
            WorkResult::Success(data) => Some(data),
            WorkResult::Failure => None,
        }
    }
}

/// Work State of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkState {
    Enqueued,
    Blocked,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl WorkState {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            WorkState::Succeeded | WorkState::Failed | WorkState::Cancelled
        )
    }
}

impl std::fmt::Display for WorkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkState::Enqueued => write!(f, "ENQUEUED"),
            WorkState::Blocked => write!(f, "BLOCKED"),
            WorkState::Running => write!(f, "RUNNING"),
            WorkState::Succeeded => write!(f, "SUCCEEDED"),
            WorkState::Failed => write!(f, "FAILED"),
            WorkState::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Observable status of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInfo {
    pub id: WorkId,
    pub stage: String,
    pub tags: Vec<String>,
    pub state: WorkState,
    pub output: WorkData,
}

impl WorkInfo {
    pub fn new(id: impl Into<String>, stage: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: id.into(),
            stage: stage.into(),
            tags,
            state: WorkState::Enqueued,
            output: WorkData::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Constraints unmet: ENQUEUED/BLOCKED -> BLOCKED
    pub fn block(&mut self) -> Result<()> {
        self.transition(&[WorkState::Enqueued, WorkState::Blocked], WorkState::Blocked)
    }

    /// ENQUEUED/BLOCKED -> RUNNING
    pub fn start(&mut self) -> Result<()> {
        self.transition(&[WorkState::Enqueued, WorkState::Blocked], WorkState::Running)
    }

    /// RUNNING -> SUCCEEDED
    pub fn succeed(&mut self, output: WorkData) -> Result<()> {
        self.transition(&[WorkState::Running], WorkState::Succeeded)?;
        self.output = output;
        Ok(())
    }

    /// Any unfinished state -> FAILED (dependents of a failed stage never run)
    pub fn fail(&mut self) -> Result<()> {
        self.finish(WorkState::Failed)
    }

    /// Any unfinished state -> CANCELLED
    pub fn cancel(&mut self) -> Result<()> {
        self.finish(WorkState::Cancelled)
    }

    fn finish(&mut self, to: WorkState) -> Result<()> {
        if self.state.is_finished() {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    fn transition(&mut self, from: &[WorkState], to: WorkState) -> Result<()> {
        if !from.contains(&self.state) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }
}
