use crate::ConfigError;
use rand::Rng;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Bounds for the randomized per-character typing cadence.
pub const CHAR_DELAY_MIN_MS: u64 = 30;
pub const CHAR_DELAY_MAX_MS: u64 = 60;

/// Settle delay after an item finishes, before the next one starts.
pub const DEFAULT_HOLD_MS: u64 = 500;

fn default_hold_ms() -> u64 {
    DEFAULT_HOLD_MS
}

/// One line of the reveal script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RevealItem {
    pub text: String,
    /// Rendered with a shell prompt in front of it.
    #[serde(default)]
    pub is_command: bool,
    /// How long to hold after the last character before advancing.
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
}

impl RevealItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_command: false,
            hold_ms: DEFAULT_HOLD_MS,
        }
    }

    pub fn command(text: impl Into<String>) -> Self {
        Self {
            is_command: true,
            ..Self::new(text)
        }
    }

    pub fn hold_ms(mut self, ms: u64) -> Self {
        self.hold_ms = ms;
        self
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Snapshot of reveal state, for rendering and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealProgress {
    pub item_index: usize,
    pub chars_revealed: usize,
    pub is_active: bool,
}

/// Reveals a script one character at a time with a variable typing cadence.
///
/// Tick-driven: the owner calls [`update`](Self::update) with the current
/// time and the sequencer advances at most one step per elapsed deadline.
/// At most one deadline is ever pending; each step schedules the next only
/// after it fires. A completed sequencer produces no further steps and
/// cannot be restarted; build a new one to replay.
#[derive(Debug)]
pub struct TypewriterReveal<R: Rng> {
    script: Vec<RevealItem>,
    item_index: usize,
    chars_revealed: usize,
    next_step_at: Option<Instant>,
    cancelled: bool,
    rng: R,
}

impl TypewriterReveal<rand::rngs::ThreadRng> {
    pub fn new(script: Vec<RevealItem>, now: Instant) -> Result<Self, ConfigError> {
        Self::with_rng(script, rand::thread_rng(), now)
    }
}

impl<R: Rng> TypewriterReveal<R> {
    /// Build with an injected random source so tests can be deterministic.
    pub fn with_rng(script: Vec<RevealItem>, rng: R, now: Instant) -> Result<Self, ConfigError> {
        if script.is_empty() {
            return Err(ConfigError::EmptyRevealScript);
        }
        let mut reveal = Self {
            script,
            item_index: 0,
            chars_revealed: 0,
            next_step_at: None,
            cancelled: false,
            rng,
        };
        reveal.next_step_at = Some(now + reveal.step_delay());
        Ok(reveal)
    }

    fn step_delay(&mut self) -> Duration {
        Duration::from_millis(
            self.rng
                .gen_range(CHAR_DELAY_MIN_MS..=CHAR_DELAY_MAX_MS),
        )
    }

    /// Advance if the pending deadline has passed. Returns true when state
    /// changed. A no-op after cancellation or completion.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        let Some(deadline) = self.next_step_at else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let char_len = self.script[self.item_index].char_len();
        let hold_ms = self.script[self.item_index].hold_ms;
        if self.chars_revealed < char_len {
            self.chars_revealed += 1;
            self.next_step_at = if self.chars_revealed == char_len {
                Some(now + Duration::from_millis(hold_ms))
            } else {
                Some(now + self.step_delay())
            };
        } else {
            // Hold elapsed (or the item was empty); advance to the next item
            self.item_index += 1;
            self.chars_revealed = 0;
            self.next_step_at = if self.item_index < self.script.len() {
                Some(now + self.step_delay())
            } else {
                None
            };
        }
        true
    }

    /// Invalidate the pending deadline. No state mutation can happen after
    /// this, regardless of how much time elapses.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.next_step_at = None;
    }

    pub fn progress(&self) -> RevealProgress {
        RevealProgress {
            item_index: self.item_index,
            chars_revealed: self.chars_revealed,
            is_active: self.is_active(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled && self.item_index < self.script.len()
    }

    pub fn is_done(&self) -> bool {
        self.item_index >= self.script.len()
    }

    pub fn script(&self) -> &[RevealItem] {
        &self.script
    }

    /// Text currently visible for an item: the full text for items already
    /// passed, a prefix for the item being typed, nothing for items not yet
    /// reached.
    pub fn visible_text(&self, idx: usize) -> Option<&str> {
        if idx > self.item_index || idx >= self.script.len() {
            return None;
        }
        let item = &self.script[idx];
        if idx < self.item_index {
            Some(&item.text)
        } else {
            let end = item
                .text
                .char_indices()
                .nth(self.chars_revealed)
                .map(|(i, _)| i)
                .unwrap_or(item.text.len());
            Some(&item.text[..end])
        }
    }
}
