use crate::config::Config;
use crate::content::Deck;
use crate::overlay::GlitchOverlay;
use crate::reveal::TypewriterReveal;
use crate::scroll::{Channel, ScrollMapper};
use crate::sequence::{konami_code, MatchResult, SequenceMatcher};
use crate::util::{clamp01, ease_out_cubic};
use crate::ConfigError;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::ThreadRng;
use std::time::{Duration, Instant};

pub const SECTION_COUNT: usize = 3;
/// Scroll distance per arrow key, in normalized page progress.
pub const KEY_SCROLL_STEP: f64 = 0.05;
/// Scroll distance per mouse-wheel notch.
pub const WHEEL_SCROLL_STEP: f64 = 0.03;
/// How long the footer stat counters take to count up.
pub const STAT_COUNT_SECS: f64 = 2.0;
/// Half-period of the ready-prompt cursor blink.
pub const CURSOR_BLINK_MS: u64 = 500;

/// Horizontal translation of the pillar strip across its section, in
/// percent of one screen width (two screens to the left, like the
/// original three-pane layout).
pub const PILLAR_TRANSLATE_PCT: f64 = -200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hero,
    Trinity,
    Footer,
}

impl Section {
    pub fn at(scroll: f64) -> Self {
        if scroll < 1.0 / 3.0 {
            Section::Hero
        } else if scroll < 2.0 / 3.0 {
            Section::Trinity
        } else {
            Section::Footer
        }
    }

    pub fn start(self) -> f64 {
        match self {
            Section::Hero => 0.0,
            Section::Trinity => 1.0 / 3.0,
            Section::Footer => 2.0 / 3.0,
        }
    }
}

/// What the event loop should do after a key was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    None,
    Redraw,
    OpenUrl(String),
    Quit,
}

/// The whole showcase model: scroll position, the three animation engines,
/// and the content deck. Owned by the running component; nothing here is
/// shared across instances or persisted.
#[derive(Debug)]
pub struct Stage {
    pub deck: Deck,
    scroll: f64,
    started_at: Instant,
    pub clock: Instant,
    last_blink: bool,
    pub reveal: TypewriterReveal<ThreadRng>,
    pub matcher: SequenceMatcher<KeyCode>,
    mapper: ScrollMapper,
    pub overlay: GlitchOverlay,
    stats_started_at: Option<Instant>,
    pub show_hint: bool,
    pub reduced_motion: bool,
    size: (u16, u16),
}

impl Stage {
    pub fn new(deck: Deck, cfg: &Config, now: Instant) -> Result<Self, ConfigError> {
        let third = 1.0 / 3.0;
        let mut channels = vec![Channel::new(vec![
            (third, 0.0),
            (2.0 * third, PILLAR_TRANSLATE_PCT),
        ])?];
        let pillar_count = deck.pillars.len().max(1);
        for i in 0..pillar_count {
            let span = third / pillar_count as f64;
            channels.push(Channel::segment(
                third + i as f64 * span,
                third + (i + 1) as f64 * span,
            )?);
        }

        let mut reveal = TypewriterReveal::new(deck.terminal.clone(), now)?;
        if cfg.reduced_motion {
            // Skip the typewriter entirely; show the finished terminal
            let mut t = now;
            while reveal.is_active() {
                t += Duration::from_secs(1);
                reveal.update(t);
            }
        }

        Ok(Self {
            deck,
            scroll: 0.0,
            started_at: now,
            clock: now,
            last_blink: true,
            reveal,
            matcher: SequenceMatcher::new(konami_code())?,
            mapper: ScrollMapper::new(channels),
            overlay: GlitchOverlay::new(),
            stats_started_at: None,
            show_hint: false,
            reduced_motion: cfg.reduced_motion,
            size: (80, 24),
        })
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn section(&self) -> Section {
        Section::at(self.scroll)
    }

    pub fn set_scroll(&mut self, t: f64) {
        self.scroll = clamp01(t);
        if self.section() == Section::Footer && self.stats_started_at.is_none() {
            // Counters start the first time the footer comes into view
            self.stats_started_at = Some(self.clock);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    /// Column offset of the pillar strip, in percent of one screen width.
    pub fn pillar_offset_pct(&self) -> f64 {
        self.mapper.channel(0).sample(self.scroll)
    }

    /// Fill of the per-pillar progress bar, in [0, 1].
    pub fn pillar_progress(&self, idx: usize) -> f64 {
        self.mapper.channel(idx + 1).sample(self.scroll)
    }

    /// Eased count-up progress for the footer stats, in [0, 1].
    pub fn stats_progress(&self) -> f64 {
        match self.stats_started_at {
            None => 0.0,
            Some(started) => {
                if self.reduced_motion {
                    return 1.0;
                }
                let elapsed = self.clock.saturating_duration_since(started).as_secs_f64();
                ease_out_cubic(clamp01(elapsed / STAT_COUNT_SECS))
            }
        }
    }

    pub fn cursor_visible(&self) -> bool {
        let elapsed = self.clock.saturating_duration_since(self.started_at);
        (elapsed.as_millis() as u64 / CURSOR_BLINK_MS) % 2 == 0
    }

    pub fn on_key(&mut self, key: KeyEvent) -> StageAction {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return StageAction::Quit;
        }

        // Every key feeds the sequence matcher; arrows also scroll, as on
        // the page the code was lifted from. Letters are matched
        // case-insensitively so Shift does not break a run.
        let token = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            code => code,
        };
        if self.matcher.on_token(token) == MatchResult::Completed {
            self.overlay.trigger(self.clock, self.size.0, self.size.1);
            if self.reduced_motion {
                self.overlay.particles.clear();
            }
        }

        match key.code {
            KeyCode::Up => self.set_scroll(self.scroll - KEY_SCROLL_STEP),
            KeyCode::Down => self.set_scroll(self.scroll + KEY_SCROLL_STEP),
            KeyCode::PageUp => self.set_scroll(self.scroll - 1.0 / SECTION_COUNT as f64),
            KeyCode::PageDown => self.set_scroll(self.scroll + 1.0 / SECTION_COUNT as f64),
            KeyCode::Home => self.set_scroll(0.0),
            KeyCode::End => self.set_scroll(1.0),
            KeyCode::Char('?') => self.show_hint = !self.show_hint,
            KeyCode::Char(c) => {
                if let Some(link) = self.deck.links.iter().find(|l| l.key == c) {
                    return StageAction::OpenUrl(link.url.clone());
                }
                return StageAction::None;
            }
            _ => return StageAction::None,
        }
        StageAction::Redraw
    }

    pub fn on_scroll(&mut self, delta: i8) {
        self.set_scroll(self.scroll + delta as f64 * WHEEL_SCROLL_STEP);
    }

    /// Advance all timed state. Returns true when something visible changed
    /// and the frame should be redrawn.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.clock = now;

        // The ready-prompt cursor keeps blinking after every animation has
        // settled, so a phase flip alone must schedule a frame.
        let blink = self.cursor_visible();
        let blink_flipped = blink != self.last_blink;
        self.last_blink = blink;

        let reveal_changed = self.reveal.update(now);
        let overlay_was_active = self.overlay.is_active();
        self.overlay.update(now);

        let stats_counting = self
            .stats_started_at
            .map(|s| now.saturating_duration_since(s).as_secs_f64() < STAT_COUNT_SECS)
            .unwrap_or(false);

        reveal_changed
            || overlay_was_active
            || self.overlay.is_active()
            || stats_counting
            || self.reveal.is_active()
            || (blink_flipped && self.section() == Section::Hero)
    }

    /// Invalidate pending animation work before the terminal is torn down.
    pub fn teardown(&mut self) {
        self.reveal.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Deck;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn stage() -> Stage {
        Stage::new(Deck::new("default"), &Config::default(), Instant::now()).unwrap()
    }

    fn press(stage: &mut Stage, code: KeyCode) -> StageAction {
        stage.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_sections_by_scroll() {
        assert_eq!(Section::at(0.0), Section::Hero);
        assert_eq!(Section::at(0.4), Section::Trinity);
        assert_eq!(Section::at(0.9), Section::Footer);
    }

    #[test]
    fn test_scroll_clamped_to_unit_range() {
        let mut s = stage();
        press(&mut s, KeyCode::Up);
        assert_eq!(s.scroll(), 0.0);
        press(&mut s, KeyCode::End);
        press(&mut s, KeyCode::Down);
        assert_eq!(s.scroll(), 1.0);
    }

    #[test]
    fn test_pillar_strip_translation() {
        let mut s = stage();
        assert_eq!(s.pillar_offset_pct(), 0.0);

        s.set_scroll(0.5);
        assert!((s.pillar_offset_pct() - PILLAR_TRANSLATE_PCT / 2.0).abs() < 1e-9);

        s.set_scroll(1.0);
        assert_eq!(s.pillar_offset_pct(), PILLAR_TRANSLATE_PCT);
    }

    #[test]
    fn test_pillar_progress_segments() {
        let mut s = stage();
        s.set_scroll(0.5); // halfway through the middle pillar's segment
        assert_eq!(s.pillar_progress(0), 1.0);
        assert!((s.pillar_progress(1) - 0.5).abs() < 1e-9);
        assert_eq!(s.pillar_progress(2), 0.0);
    }

    #[test]
    fn test_konami_triggers_overlay() {
        let mut s = stage();
        for code in konami_code() {
            press(&mut s, code);
        }
        assert!(s.overlay.is_active());
    }

    #[test]
    fn test_arrows_scroll_and_feed_matcher() {
        let mut s = stage();
        s.set_scroll(0.5);
        press(&mut s, KeyCode::Up);
        press(&mut s, KeyCode::Up);
        assert_eq!(s.matcher.progress(), 2);
        assert!((s.scroll() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_link_key_opens_url() {
        let mut s = stage();
        let url = s.deck.links[0].url.clone();
        let key = s.deck.links[0].key;
        assert_eq!(press(&mut s, KeyCode::Char(key)), StageAction::OpenUrl(url));
    }

    #[test]
    fn test_quit_keys() {
        let mut s = stage();
        assert_eq!(press(&mut s, KeyCode::Esc), StageAction::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(s.on_key(ctrl_c), StageAction::Quit);
    }

    #[test]
    fn test_stats_count_up_begins_in_footer() {
        let mut s = stage();
        assert_eq!(s.stats_progress(), 0.0);

        press(&mut s, KeyCode::End);
        assert_eq!(s.stats_progress(), 0.0, "counter starts at zero");

        s.on_tick(s.clock + Duration::from_secs(1));
        let mid = s.stats_progress();
        assert!(mid > 0.0 && mid < 1.0);

        s.on_tick(s.clock + Duration::from_secs(3));
        assert_eq!(s.stats_progress(), 1.0);
    }

    #[test]
    fn test_tick_requests_redraw_while_reveal_active() {
        let mut s = stage();
        assert!(s.on_tick(s.clock + Duration::from_millis(100)));
    }

    #[test]
    fn test_teardown_cancels_reveal() {
        let mut s = stage();
        s.teardown();
        let before = s.reveal.progress();
        s.on_tick(s.clock + Duration::from_secs(60));
        assert_eq!(s.reveal.progress(), before);
        assert!(!s.reveal.is_active());
    }

    #[test]
    fn test_reduced_motion_skips_typewriter() {
        let cfg = Config {
            reduced_motion: true,
            ..Config::default()
        };
        let s = Stage::new(Deck::new("default"), &cfg, Instant::now()).unwrap();
        assert!(s.reveal.is_done());
    }

    #[test]
    fn test_idle_blink_still_requests_redraws() {
        let cfg = Config {
            reduced_motion: true,
            ..Config::default()
        };
        let mut s = Stage::new(Deck::new("default"), &cfg, Instant::now()).unwrap();
        assert!(s.reveal.is_done());

        // With every animation settled, the only visible change left is the
        // ready-prompt cursor; a tick crossing a blink boundary must still
        // ask for a frame, and the visibility must actually have changed.
        let before = s.cursor_visible();
        let mut now = s.clock;
        let mut redrawn = false;
        for _ in 0..30 {
            now += Duration::from_millis(100);
            if s.on_tick(now) {
                redrawn = true;
                break;
            }
        }
        assert!(redrawn, "blink transitions must schedule a redraw");
        assert_ne!(s.cursor_visible(), before);
    }

    #[test]
    fn test_blink_cadence_follows_the_clock_not_the_tick_rate() {
        let mut s = stage();
        s.on_tick(s.clock + Duration::from_millis(100));
        let early = s.cursor_visible();

        // One long tick, as with a slow configured tick rate, still lands
        // in the next blink phase.
        s.on_tick(s.clock + Duration::from_millis(500));
        assert_ne!(s.cursor_visible(), early);
    }

    #[test]
    fn test_konami_completes_with_shifted_letters() {
        let mut s = stage();
        for code in [
            KeyCode::Up,
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::Left,
            KeyCode::Right,
        ] {
            press(&mut s, code);
        }
        s.on_key(KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT));
        s.on_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert!(s.overlay.is_active(), "shift must not break the code");
    }

    #[test]
    fn test_hint_toggle() {
        let mut s = stage();
        assert!(!s.show_hint);
        press(&mut s, KeyCode::Char('?'));
        assert!(s.show_hint);
        press(&mut s, KeyCode::Char('?'));
        assert!(!s.show_hint);
    }
}
