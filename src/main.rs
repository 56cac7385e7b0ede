use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};
use webbrowser::Browser;

use vitrine::config::{Config, ConfigStore, FileConfigStore};
use vitrine::content::Deck;
use vitrine::runtime::{CrosstermEventSource, FixedTicker, Runner, StageEvent};
use vitrine::stage::{Section, Stage, StageAction};
use vitrine::ui;

/// animated terminal landing page
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An animated terminal landing page: a typewriter hero terminal, a scroll-driven pillar strip with per-segment progress bars, and a konami-code easter egg in the footer."
)]
pub struct Cli {
    /// section to open on
    #[clap(short = 's', long, value_enum, default_value_t = StartSection::Hero)]
    section: StartSection,

    /// content deck to display
    #[clap(short = 'd', long)]
    deck: Option<String>,

    /// skip the typewriter and count-up animations
    #[clap(long)]
    reduced_motion: bool,

    /// animation tick interval in milliseconds
    #[clap(short = 't', long)]
    tick_rate: Option<u64>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum StartSection {
    Hero,
    Trinity,
    Footer,
}

impl StartSection {
    fn as_section(&self) -> Section {
        match self {
            StartSection::Hero => Section::Hero,
            StartSection::Trinity => Section::Trinity,
            StartSection::Footer => Section::Footer,
        }
    }
}

impl Cli {
    /// CLI flags override whatever the config file holds
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(deck) = &self.deck {
            cfg.deck = deck.clone();
        }
        if let Some(tick) = self.tick_rate {
            cfg.tick_rate_ms = tick.max(1);
        }
        if self.reduced_motion {
            cfg.reduced_motion = true;
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let cfg = cli.apply(FileConfigStore::new().load());

    let mut stage = Stage::new(Deck::new(&cfg.deck), &cfg, Instant::now())?;
    stage.set_scroll(cli.section.as_section().start());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut stage, &cfg);

    // Pending animation timers must not outlive the terminal
    stage.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    stage: &mut Stage,
    cfg: &Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(cfg.tick_rate_ms)),
    );

    let size = terminal.size()?;
    stage.resize(size.width, size.height);
    terminal.draw(|f| ui::draw(stage, f))?;

    loop {
        match runner.step() {
            StageEvent::Tick => {
                if stage.on_tick(Instant::now()) {
                    terminal.draw(|f| ui::draw(stage, f))?;
                }
            }
            StageEvent::Scroll(delta) => {
                stage.on_scroll(delta);
                terminal.draw(|f| ui::draw(stage, f))?;
            }
            StageEvent::Resize => {
                let size = terminal.size()?;
                stage.resize(size.width, size.height);
                terminal.draw(|f| ui::draw(stage, f))?;
            }
            StageEvent::Key(key) => {
                match stage.on_key(key) {
                    StageAction::Quit => break,
                    StageAction::OpenUrl(url) => {
                        if Browser::is_available() {
                            webbrowser::open(&url).unwrap_or_default();
                        }
                    }
                    StageAction::Redraw | StageAction::None => {}
                }
                terminal.draw(|f| ui::draw(stage, f))?;
            }
        }
    }

    Ok(())
}
