use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent};
use vani_core::config::WaveConfig;
use vani_core::{DashboardState, UiCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    History,
    Logs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    None,
    Quit,
    Command(UiCommand),
}

pub struct App {
    pub tab: Tab,
    pub state: DashboardState,
    pub wave: WaveConfig,
    pub should_quit: bool,
    pub logs: Arc<Mutex<VecDeque<String>>>,
    pub log_scroll: usize,
    pub log_auto_scroll: bool,
}

impl App {
    pub fn new(logs: Arc<Mutex<VecDeque<String>>>, wave: WaveConfig) -> Self {
        Self {
            tab: Tab::Dashboard,
            state: DashboardState::default(),
            wave,
            should_quit: false,
            logs,
            log_scroll: 0,
            log_auto_scroll: true,
        }
    }

    pub fn update_state(&mut self, new_state: DashboardState) {
        self.state = new_state;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        // Global keys
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return AppAction::Quit;
            }
            KeyCode::Char('1') => {
                self.tab = Tab::Dashboard;
                return AppAction::None;
            }
            KeyCode::Char('2') => {
                self.tab = Tab::History;
                return AppAction::None;
            }
            KeyCode::Char('3') => {
                self.tab = Tab::Logs;
                return AppAction::None;
            }
            KeyCode::Char('p') => {
                return AppAction::Command(UiCommand::SetPlaybackEnabled(
                    !self.state.playback_enabled,
                ));
            }
            KeyCode::Char('v') => {
                return AppAction::Command(UiCommand::VoiceQuery);
            }
            _ => {}
        }

        match self.tab {
            Tab::Logs => self.handle_logs_key(key),
            Tab::Dashboard | Tab::History => AppAction::None,
        }
    }

    fn handle_logs_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Up => {
                self.log_scroll = self.log_scroll.saturating_add(1);
                self.log_auto_scroll = false;
                AppAction::None
            }
            KeyCode::Down => {
                self.log_scroll = self.log_scroll.saturating_sub(1);
                AppAction::None
            }
            KeyCode::Char('G') => {
                self.log_scroll = 0;
                self.log_auto_scroll = true;
                AppAction::None
            }
            _ => AppAction::None,
        }
    }
}
