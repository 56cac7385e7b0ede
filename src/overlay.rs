use crate::util::{clamp01, ease_out_cubic};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;

pub const OVERLAY_DURATION_SECS: f64 = 3.0;
pub const HEADLINE: &str = "ACHIEVEMENT UNLOCKED";
pub const SUBLINE: &str = "You found the secret.";

/// Background flash at the start of the overlay, cycling through the glitch
/// palette before settling back to the void.
const FLASH_SECS: f64 = 0.5;
pub const FLASH_PALETTE_LEN: usize = 3; // magenta, cyan, green

/// Progress bar fill: starts after the flash, eased over two seconds.
const BAR_DELAY_SECS: f64 = 0.5;
const BAR_FILL_SECS: f64 = 2.0;

/// Decorative particle thrown from the center when the overlay triggers.
#[derive(Debug, Clone)]
pub struct GlitchParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    age: f64,
    max_age: f64,
}

impl GlitchParticle {
    fn new(x: f64, y: f64) -> Self {
        let mut rng = rand::thread_rng();

        Self {
            x,
            y,
            vel_x: rng.gen_range(-4.0..4.0),
            vel_y: rng.gen_range(-5.0..-1.0),
            symbol: *['*', '+', '·', '▲', '■', '✦', '◆']
                .choose(&mut rng)
                .unwrap_or(&'*'),
            color_index: rng.gen_range(0..FLASH_PALETTE_LEN),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
        }
    }

    /// Returns false once the particle has expired.
    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 12.0 * dt; // gravity pulls the burst back down
        self.age += dt;
        self.age < self.max_age
    }
}

/// The konami completion effect: a short glitch flash, a particle burst, an
/// achievement banner, and a progress bar that fills while the overlay is
/// up. Auto-closes after [`OVERLAY_DURATION_SECS`].
#[derive(Debug)]
pub struct GlitchOverlay {
    pub particles: Vec<GlitchParticle>,
    started_at: Option<Instant>,
    is_active: bool,
    terminal_width: f64,
    terminal_height: f64,
}

impl GlitchOverlay {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            started_at: None,
            is_active: false,
            terminal_width: 80.0,
            terminal_height: 24.0,
        }
    }

    pub fn trigger(&mut self, now: Instant, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started_at = Some(now);
        self.is_active = true;
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;
        for _ in 0..40 {
            let offset_x = rng.gen_range(-12.0..12.0);
            let offset_y = rng.gen_range(-4.0..4.0);
            self.particles
                .push(GlitchParticle::new(center_x + offset_x, center_y + offset_y));
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    fn elapsed(&self, now: Instant) -> f64 {
        self.started_at
            .map(|s| now.saturating_duration_since(s).as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn update(&mut self, now: Instant) {
        if !self.is_active {
            return;
        }

        if self.elapsed(now) >= OVERLAY_DURATION_SECS {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let dt = 0.1; // fixed timestep per tick
        let (w, h) = (self.terminal_width, self.terminal_height);
        self.particles.retain_mut(|p| {
            let alive = p.update(dt);
            let buffer = 5.0;
            let off_screen = p.y > h + buffer || p.x < -buffer || p.x > w + buffer;
            alive && !off_screen
        });
    }

    /// Index into the glitch palette during the opening flash, None once the
    /// background has settled.
    pub fn flash_color_index(&self, now: Instant) -> Option<usize> {
        if !self.is_active {
            return None;
        }
        let elapsed = self.elapsed(now);
        if elapsed >= FLASH_SECS {
            return None;
        }
        let slot = (elapsed / FLASH_SECS * FLASH_PALETTE_LEN as f64) as usize;
        Some(slot.min(FLASH_PALETTE_LEN - 1))
    }

    /// Fill ratio of the overlay progress bar in [0, 1].
    pub fn bar_fill(&self, now: Instant) -> f64 {
        if !self.is_active {
            return 0.0;
        }
        ease_out_cubic(clamp01((self.elapsed(now) - BAR_DELAY_SECS) / BAR_FILL_SECS))
    }
}

impl Default for GlitchOverlay {
    fn default() -> Self {
        Self::new()
    }
}
