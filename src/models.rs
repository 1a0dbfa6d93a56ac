use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::messages::AppEvent;
use crate::overlay::Overlay;
use crate::provider::Provider;
use crate::scanner::ScanStatus;

/// How long the transient status line ("Saved!") stays up.
pub const STATUS_TTL: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    Ask,
    Repo,
    Settings,
}

impl ActiveTab {
    pub fn as_index(self) -> usize {
        match self {
            ActiveTab::Ask => 0,
            ActiveTab::Repo => 1,
            ActiveTab::Settings => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ActiveTab::Ask => ActiveTab::Repo,
            ActiveTab::Repo => ActiveTab::Settings,
            ActiveTab::Settings => ActiveTab::Ask,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub settings: Settings,
    pub tab: ActiveTab,
    pub mode: InputMode,

    // Ask section
    pub question: String,
    pub answer: Option<Result<String, String>>,
    pub asking: bool,

    // Repository section
    pub repo_url: String,
    pub scanning: bool,
    pub scan: Option<ScanStatus>,

    // Settings form
    pub api_key_input: String,
    pub provider_choice: Provider,

    // Explain flow, rendered in the overlay
    pub explaining: bool,
    pub overlay: Overlay,

    pub status: Option<(String, Instant)>,
}

impl App {
    pub fn new(settings: Settings, repo_url: Option<String>) -> Self {
        let api_key_input = settings.api_key.clone().unwrap_or_default();
        let provider_choice = settings.provider;
        Self {
            settings,
            tab: ActiveTab::Ask,
            mode: InputMode::Normal,
            question: String::new(),
            answer: None,
            asking: false,
            repo_url: repo_url.unwrap_or_default(),
            scanning: false,
            scan: None,
            api_key_input,
            provider_choice,
            explaining: false,
            overlay: Overlay::default(),
            status: None,
        }
    }

    /// Applies one routed event. Runs on the UI thread only.
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ShowLoading { title } => {
                self.overlay.open(title);
            }
            AppEvent::ShowResult { text } => {
                self.explaining = false;
                // Dropped silently when the overlay was closed meanwhile.
                self.overlay.show_result(text);
            }
            AppEvent::AnswerReady { result } => {
                // The trigger is re-enabled on success and error alike.
                self.asking = false;
                self.answer = Some(result.map_err(|e| e.to_string()));
            }
            AppEvent::ScanFinished { status } => {
                self.scanning = false;
                self.scan = Some(status);
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some((message.into(), now + STATUS_TTL));
    }

    pub fn tick(&mut self, now: Instant) {
        self.overlay.tick(now);
        if let Some((_, until)) = &self.status {
            if now >= *until {
                self.status = None;
            }
        }
    }
}
