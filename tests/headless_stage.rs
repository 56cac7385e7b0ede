use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use vitrine::config::Config;
use vitrine::content::Deck;
use vitrine::runtime::{FixedTicker, Runner, StageEvent, TestEventSource};
use vitrine::stage::{Section, Stage, StageAction};

fn key(code: KeyCode) -> StageEvent {
    StageEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless integration using the internal runtime + Stage without a TTY.
// Verifies the konami flow end to end via Runner/TestEventSource.
#[test]
fn headless_konami_flow_triggers_overlay() {
    let mut stage = Stage::new(Deck::new("default"), &Config::default(), Instant::now()).unwrap();

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    for code in vitrine::sequence::konami_code() {
        tx.send(key(code)).unwrap();
    }

    let mut quit = false;
    for _ in 0..100u32 {
        match runner.step() {
            StageEvent::Tick => {
                stage.on_tick(Instant::now());
                if stage.overlay.is_active() {
                    break;
                }
            }
            StageEvent::Resize => {}
            StageEvent::Scroll(delta) => stage.on_scroll(delta),
            StageEvent::Key(k) => {
                if stage.on_key(k) == StageAction::Quit {
                    quit = true;
                    break;
                }
            }
        }
    }

    assert!(!quit);
    assert!(stage.overlay.is_active(), "konami should unlock the overlay");
    // Progress was consumed by completion
    assert_eq!(stage.matcher.progress(), 0);
}

#[test]
fn headless_scroll_keys_reach_every_section() {
    let mut stage = Stage::new(Deck::new("default"), &Config::default(), Instant::now()).unwrap();
    assert_eq!(stage.section(), Section::Hero);

    stage.on_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
    assert_eq!(stage.section(), Section::Trinity);

    stage.on_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
    assert_eq!(stage.section(), Section::Footer);

    stage.on_key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
    assert_eq!(stage.section(), Section::Hero);
}

#[test]
fn headless_wheel_scroll_moves_the_page() {
    let mut stage = Stage::new(Deck::new("default"), &Config::default(), Instant::now()).unwrap();

    for _ in 0..30 {
        stage.on_scroll(1);
    }
    assert!(stage.scroll() > 0.5);

    for _ in 0..60 {
        stage.on_scroll(-1);
    }
    assert_eq!(stage.scroll(), 0.0, "clamped at the top");
}

#[test]
fn headless_typewriter_completes_under_simulated_time() {
    let start = Instant::now();
    let mut stage = Stage::new(Deck::new("default"), &Config::default(), start).unwrap();

    // Worst case: every char at the slow end of the cadence plus all holds
    let mut now = start;
    let mut steps = 0u32;
    while stage.reveal.is_active() && steps < 10_000 {
        now += Duration::from_millis(1100);
        stage.on_tick(now);
        steps += 1;
    }

    assert!(stage.reveal.is_done());
    let last = stage.deck.terminal.len() - 1;
    assert_eq!(
        stage.reveal.visible_text(last).unwrap(),
        stage.deck.terminal[last].text
    );
}

#[test]
fn headless_overlay_closes_after_three_seconds() {
    let start = Instant::now();
    let mut stage = Stage::new(Deck::new("default"), &Config::default(), start).unwrap();

    for code in vitrine::sequence::konami_code() {
        stage.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }
    assert!(stage.overlay.is_active());

    stage.on_tick(stage.clock + Duration::from_millis(3100));
    assert!(!stage.overlay.is_active(), "overlay auto-closes");
}
