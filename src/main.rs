use crossterm::{
    event::{self, Event as CEvent, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::error::Error;
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tui::{backend::{Backend, CrosstermBackend}, Terminal};

use crime_dash::app::{App, Control};
use crime_dash::config::DashboardConfig;
use crime_dash::csv_reader;
use crime_dash::dataset::Dataset;
use crime_dash::logging;
use crime_dash::reactive::Dashboard;
use crime_dash::ui;

enum Event<I> {
    Input(I),
    Tick,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = DashboardConfig::load()?;
    logging::init_file(&config.log_filter, &config.log_path)?;
    info!(data = %config.data_path.display(), "startup");

    let records = csv_reader::read_data(&config.data_path)?;
    let dataset = Dataset::new(records)?;
    let mut app = App::new(Dashboard::build(&dataset));

    enable_raw_mode()?;

    let (tx, rx) = mpsc::channel();
    let tick_rate = config.tick_rate();
    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            match event::poll(timeout) {
                Ok(true) => match event::read() {
                    Ok(CEvent::Key(key)) => {
                        if key.kind == KeyEventKind::Press && tx.send(Event::Input(key)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("event read failed: {}", e),
                },
                Ok(false) => {}
                Err(e) => {
                    error!("event poll failed: {}", e);
                    break;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
    });

    let stdout = io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run(&mut terminal, &mut app, &rx);

    disable_raw_mode()?;
    terminal.clear()?;
    terminal.show_cursor()?;
    info!("shutdown");
    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mpsc::Receiver<Event<KeyEvent>>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|rect| ui::draw(rect, app))?;

        match rx.recv()? {
            Event::Input(event) => {
                if app.on_key(event.code) == Control::Quit {
                    return Ok(());
                }
            }
            Event::Tick => {}
        }
    }
}
