use crate::ConfigError;
use crossterm::event::KeyCode;

/// Result of feeding one token to a [`SequenceMatcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// The token extended the current prefix match to the given length.
    Progressing(usize),
    /// The token broke the match; accumulated progress was cleared.
    Reset,
    /// The full target sequence was matched. Progress has already been
    /// cleared, ready for a re-trigger.
    Completed,
}

/// Detects an ordered sequence inside a live token stream.
///
/// Restart policy is deliberately naive: on a mismatch the accumulated
/// prefix is cleared and the offending token is discarded outright, even if
/// it equals the first element of the target. Only a token arriving while
/// the state is already empty can begin a new match. There is no KMP-style
/// carry-over and no timeout; elapsed time never expires a match in
/// progress.
#[derive(Debug, Clone)]
pub struct SequenceMatcher<T> {
    target: Vec<T>,
    progress: usize,
}

impl<T: PartialEq> SequenceMatcher<T> {
    pub fn new(target: Vec<T>) -> Result<Self, ConfigError> {
        if target.is_empty() {
            return Err(ConfigError::EmptyTargetSequence);
        }
        Ok(Self {
            target,
            progress: 0,
        })
    }

    /// Feed the next token from the input stream.
    pub fn on_token(&mut self, token: T) -> MatchResult {
        if token == self.target[self.progress] {
            self.progress += 1;
            if self.progress == self.target.len() {
                // Completion consumes the match
                self.progress = 0;
                MatchResult::Completed
            } else {
                MatchResult::Progressing(self.progress)
            }
        } else {
            // Discard the token entirely; it is not retried at position 0
            self.progress = 0;
            MatchResult::Reset
        }
    }

    /// Number of target positions matched so far, for progress indicators.
    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }
}

/// The classic code: ↑ ↑ ↓ ↓ ← → ← → B A
pub fn konami_code() -> Vec<KeyCode> {
    vec![
        KeyCode::Up,
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Char('b'),
        KeyCode::Char('a'),
    ]
}
