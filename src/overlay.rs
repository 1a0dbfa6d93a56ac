use std::time::{Duration, Instant};

/// Detach delay after the reverse transition starts.
pub const CLOSE_DELAY: Duration = Duration::from_millis(300);

pub const LOADING_TITLE: &str = "Analyzing Code...";
pub const LOADING_TEXT: &str = "Thinking...";

/// The injected answer popup. One instance exists per app; flows talk to it
/// only through these methods, from the UI thread.
#[derive(Debug, Default)]
pub struct Overlay {
    state: OverlayState,
}

#[derive(Debug, Default, PartialEq)]
pub enum OverlayState {
    #[default]
    Absent,
    Open {
        title: String,
        content: OverlayContent,
        scroll: u16,
    },
    Closing {
        deadline: Instant,
    },
}

#[derive(Debug, PartialEq)]
pub enum OverlayContent {
    Loading,
    Result(String),
}

impl Overlay {
    /// Attaches a fresh overlay in its loading state. An existing overlay,
    /// closing or not, is removed immediately without a transition.
    pub fn open(&mut self, title: impl Into<String>) {
        self.state = OverlayState::Open {
            title: title.into(),
            content: OverlayContent::Loading,
            scroll: 0,
        };
    }

    /// Replaces the content area. No-op when no overlay is attached; a
    /// result that arrives after the user closed the overlay is dropped.
    pub fn show_result(&mut self, text: String) {
        if let OverlayState::Open { content, scroll, .. } = &mut self.state {
            *content = OverlayContent::Result(text);
            *scroll = 0;
        }
    }

    /// Starts the reverse transition; the overlay detaches on the first
    /// tick past the deadline.
    pub fn close(&mut self, now: Instant) {
        if matches!(self.state, OverlayState::Open { .. }) {
            self.state = OverlayState::Closing {
                deadline: now + CLOSE_DELAY,
            };
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let OverlayState::Closing { deadline } = self.state {
            if now >= deadline {
                self.state = OverlayState::Absent;
            }
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, OverlayState::Open { .. })
    }

    /// True while anything is on screen, including the closing transition.
    pub fn is_visible(&self) -> bool {
        !matches!(self.state, OverlayState::Absent)
    }

    pub fn result_text(&self) -> Option<&str> {
        match &self.state {
            OverlayState::Open {
                content: OverlayContent::Result(text),
                ..
            } => Some(text),
            _ => None,
        }
    }

    pub fn scroll_up(&mut self) {
        if let OverlayState::Open { scroll, .. } = &mut self.state {
            *scroll = scroll.saturating_sub(1);
        }
    }

    pub fn scroll_down(&mut self, max: u16) {
        if let OverlayState::Open { scroll, .. } = &mut self.state {
            *scroll = scroll.saturating_add(1).min(max);
        }
    }
}
