use std::collections::HashMap;

use crossterm::event::KeyCode;
use tracing::{debug, error, warn};

use crate::catalog::ChartId;
use crate::chart::ChartSpec;
use crate::reactive::{bindings, Dashboard, SelectorId, Selection};

pub const MENU_TITLES: [&str; 4] = ["Overview", "Community", "State", "Quit"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Overview,
    Community,
    State,
}

impl From<MenuItem> for usize {
    fn from(input: MenuItem) -> usize {
        match input {
            MenuItem::Overview => 0,
            MenuItem::Community => 1,
            MenuItem::State => 2,
        }
    }
}

impl MenuItem {
    pub fn selector(&self) -> Option<SelectorId> {
        match self {
            MenuItem::Overview => None,
            MenuItem::Community => Some(SelectorId::Community),
            MenuItem::State => Some(SelectorId::State),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recomputing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// A dropdown: its options and the index of the current one.
#[derive(Debug, Clone)]
pub struct Selector {
    pub id: SelectorId,
    options: Vec<String>,
    index: usize,
}

impl Selector {
    pub fn new(id: SelectorId, options: Vec<String>) -> Self {
        Selector { id, options, index: 0 }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<Selection> {
        self.options
            .get(self.index)
            .map(|key| Selection::new(self.id, key.clone()))
    }

    pub fn next(&mut self) {
        if !self.options.is_empty() {
            self.index = (self.index + 1) % self.options.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.options.is_empty() {
            self.index = (self.index + self.options.len() - 1) % self.options.len();
        }
    }
}

/// What a reactive chart slot currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Ready(ChartSpec),
    Unavailable(String),
}

pub struct App<'a> {
    dashboard: Dashboard<'a>,
    pub active_menu_item: MenuItem,
    phase: Phase,
    community: Selector,
    state: Selector,
    views: HashMap<ChartId, ChartView>,
}

impl<'a> App<'a> {
    pub fn new(dashboard: Dashboard<'a>) -> Self {
        let community = Selector::new(
            SelectorId::Community,
            dashboard.options(SelectorId::Community),
        );
        let state = Selector::new(SelectorId::State, dashboard.options(SelectorId::State));
        let mut app = App {
            dashboard,
            active_menu_item: MenuItem::Overview,
            phase: Phase::Idle,
            community,
            state,
            views: HashMap::new(),
        };
        for selector in SelectorId::ALL {
            app.recompute(selector);
        }
        app
    }

    pub fn dashboard(&self) -> &Dashboard<'a> {
        &self.dashboard
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selector(&self, id: SelectorId) -> &Selector {
        match id {
            SelectorId::Community => &self.community,
            SelectorId::State => &self.state,
        }
    }

    fn selector_mut(&mut self, id: SelectorId) -> &mut Selector {
        match id {
            SelectorId::Community => &mut self.community,
            SelectorId::State => &mut self.state,
        }
    }

    pub fn view(&self, chart: ChartId) -> Option<&ChartView> {
        self.views.get(&chart)
    }

    pub fn select_next(&mut self, id: SelectorId) {
        self.selector_mut(id).next();
        self.recompute(id);
    }

    pub fn select_prev(&mut self, id: SelectorId) {
        self.selector_mut(id).prev();
        self.recompute(id);
    }

    /// Runs to completion before returning, so callers only ever see `Idle`.
    fn recompute(&mut self, id: SelectorId) {
        self.phase = Phase::Recomputing;
        let current = self.selector(id).current();
        match current {
            Some(selection) => {
                debug!(selector = %id, selection = selection.key(), "recomputing");
                for (chart, result) in self.dashboard.update_all(&selection) {
                    let view = match result {
                        Ok(spec) => ChartView::Ready(spec),
                        Err(e) if e.is_recoverable() => {
                            warn!(chart = %chart, "{}", e);
                            ChartView::Unavailable(e.to_string())
                        }
                        Err(e) => {
                            error!(chart = %chart, "{}", e);
                            ChartView::Unavailable(e.to_string())
                        }
                    };
                    self.views.insert(chart, view);
                }
            }
            None => {
                for &chart in bindings(id) {
                    self.views
                        .insert(chart, ChartView::Unavailable(format!("no {} to select", id)));
                }
            }
        }
        self.phase = Phase::Idle;
    }

    pub fn on_key(&mut self, code: KeyCode) -> Control {
        match code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('o') => self.active_menu_item = MenuItem::Overview,
            KeyCode::Char('c') => self.active_menu_item = MenuItem::Community,
            KeyCode::Char('s') => self.active_menu_item = MenuItem::State,
            KeyCode::Right | KeyCode::Char('n') => {
                if let Some(id) = self.active_menu_item.selector() {
                    self.select_next(id);
                }
            }
            KeyCode::Left | KeyCode::Char('p') => {
                if let Some(id) = self.active_menu_item.selector() {
                    self.select_prev(id);
                }
            }
            _ => {}
        }
        Control::Continue
    }
}
