use std::time::Instant;

use arboard::Clipboard;
use crossterm::event::KeyCode;
use tokio::runtime::Runtime;
use tracing::warn;

use anyhow::Result;

use crate::config::{self, NO_API_KEY_MSG};
use crate::markdown;
use crate::messages::{AppEvent, EventBus};
use crate::models::{ActiveTab, App, InputMode};
use crate::overlay::LOADING_TITLE;
use crate::provider::{ExplainRequest, ProviderClient};
use crate::scanner::{self, ScanStatus};
use crate::utils;

pub fn handle_key(
    key: KeyCode,
    app: &mut App,
    client: &ProviderClient,
    http: &reqwest::Client,
    bus: &EventBus,
    rt: &Runtime,
) -> Result<bool> {
    let now = Instant::now();

    match app.mode {
        InputMode::Editing => match key {
            KeyCode::Esc => app.mode = InputMode::Normal,
            KeyCode::Enter => {
                app.mode = InputMode::Normal;
                submit_current(app, client, http, bus, rt, now);
            }
            KeyCode::Backspace => {
                active_field(app).pop();
            }
            KeyCode::Char(c) => active_field(app).push(c),
            _ => {}
        },
        InputMode::Normal => match key {
            KeyCode::Char('q') => return Ok(false),
            KeyCode::Char('1') => app.tab = ActiveTab::Ask,
            KeyCode::Char('2') => {
                app.tab = ActiveTab::Repo;
                // Activating the repository section triggers a scan.
                start_scan(app, http, bus, rt);
            }
            KeyCode::Char('3') => app.tab = ActiveTab::Settings,
            KeyCode::Tab => {
                app.tab = app.tab.next();
                if app.tab == ActiveTab::Repo {
                    start_scan(app, http, bus, rt);
                }
            }
            KeyCode::BackTab => {
                app.tab = app.tab.prev();
                if app.tab == ActiveTab::Repo {
                    start_scan(app, http, bus, rt);
                }
            }
            KeyCode::Char('i') => app.mode = InputMode::Editing,
            KeyCode::Char('e') => explain_selection(app, client, bus, rt, now),
            KeyCode::Char('p') if app.tab == ActiveTab::Settings => {
                app.provider_choice = app.provider_choice.toggled();
            }
            KeyCode::Char('s') if app.tab == ActiveTab::Settings => {
                save_settings_flow(app, now);
            }
            KeyCode::Enter => submit_current(app, client, http, bus, rt, now),
            KeyCode::Esc => app.overlay.close(now),
            KeyCode::Char('c') => {
                // Copy the overlay answer, as rendered from the provider.
                if let Some(text) = app.overlay.result_text() {
                    let mut clipboard = Clipboard::new().ok();
                    if let Some(cb) = clipboard.as_mut() {
                        let _ = cb.set_text(text.to_string());
                    }
                }
            }
            KeyCode::Up | KeyCode::Char('k') => app.overlay.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(text) = app.overlay.result_text() {
                    let max = utils::overlay_scroll_max(markdown::rendered_line_count(text))?;
                    app.overlay.scroll_down(max);
                }
            }
            _ => {}
        },
    }
    Ok(true)
}

fn active_field(app: &mut App) -> &mut String {
    match app.tab {
        ActiveTab::Ask => &mut app.question,
        ActiveTab::Repo => &mut app.repo_url,
        ActiveTab::Settings => &mut app.api_key_input,
    }
}

fn submit_current(
    app: &mut App,
    client: &ProviderClient,
    http: &reqwest::Client,
    bus: &EventBus,
    rt: &Runtime,
    now: Instant,
) {
    match app.tab {
        ActiveTab::Ask => start_ask(app, client, bus, rt),
        ActiveTab::Repo => start_scan(app, http, bus, rt),
        ActiveTab::Settings => save_settings_flow(app, now),
    }
}

/// Ask flow: one request at a time, trigger re-enabled by the reply event.
fn start_ask(app: &mut App, client: &ProviderClient, bus: &EventBus, rt: &Runtime) {
    if app.asking {
        return;
    }
    let question = app.question.trim().to_string();
    if question.is_empty() {
        return;
    }
    let Some(api_key) = configured_key(app) else {
        // Configuration error, surfaced directly; no request is built.
        app.answer = Some(Err(NO_API_KEY_MSG.to_string()));
        return;
    };

    app.asking = true;
    app.answer = None;

    let provider = app.settings.provider;
    let model = app.settings.model_for(provider).to_string();
    let client = client.clone();
    let bus = bus.clone();
    rt.spawn(async move {
        let result = client
            .explain(&ExplainRequest {
                source_text: &question,
                api_key: &api_key,
                provider,
                model: &model,
            })
            .await;
        if bus.dispatch(AppEvent::AnswerReady { result }).is_err() {
            warn!("answer arrived after the view went away");
        }
    });
}

/// Explain flow, driven by the clipboard selection: loading overlay first,
/// then the provider call, then the result through the same channel.
fn explain_selection(app: &mut App, client: &ProviderClient, bus: &EventBus, rt: &Runtime, now: Instant) {
    if app.explaining {
        return;
    }
    let selection = Clipboard::new()
        .ok()
        .and_then(|mut cb| cb.get_text().ok())
        .unwrap_or_default();
    let selection = selection.trim().to_string();
    if selection.is_empty() {
        app.set_status("Copy some code first, then press e.", now);
        return;
    }

    if bus
        .dispatch(AppEvent::ShowLoading {
            title: LOADING_TITLE.to_string(),
        })
        .is_err()
    {
        app.set_status("View not ready, try again.", now);
        return;
    }

    let Some(api_key) = configured_key(app) else {
        let _ = bus.dispatch(AppEvent::ShowResult {
            text: NO_API_KEY_MSG.to_string(),
        });
        return;
    };

    app.explaining = true;

    let provider = app.settings.provider;
    let model = app.settings.model_for(provider).to_string();
    let client = client.clone();
    let bus = bus.clone();
    rt.spawn(async move {
        let result = client
            .explain(&ExplainRequest {
                source_text: &selection,
                api_key: &api_key,
                provider,
                model: &model,
            })
            .await;
        let text = match result {
            Ok(text) => text,
            Err(err) => format!("Error: {err}"),
        };
        if bus.dispatch(AppEvent::ShowResult { text }).is_err() {
            warn!("explanation arrived after the view went away");
        }
    });
}

fn start_scan(app: &mut App, http: &reqwest::Client, bus: &EventBus, rt: &Runtime) {
    if app.scanning {
        return;
    }
    let mut url = app.repo_url.trim().to_string();
    if url.is_empty() || !scanner::looks_like_repo_url(&url) {
        app.scan = Some(ScanStatus::NotRepoPage);
        return;
    }
    if !url.starts_with("http") {
        url = format!("https://{url}");
    }

    app.scanning = true;
    app.scan = None;

    let http = http.clone();
    let bus = bus.clone();
    rt.spawn(async move {
        let status = match scanner::fetch_repo_page(&http, &url).await {
            Ok(html) => match scanner::scan_repo_page(&url, &html) {
                Some(scan) => ScanStatus::Done(scan),
                None => ScanStatus::Failed,
            },
            Err(err) => ScanStatus::Unavailable(err.to_string()),
        };
        if bus.dispatch(AppEvent::ScanFinished { status }).is_err() {
            warn!("scan result arrived after the view went away");
        }
    });
}

fn save_settings_flow(app: &mut App, now: Instant) {
    let api_key = app.api_key_input.trim().to_string();
    let provider = app.provider_choice;
    match config::save_settings(&config::get_user_config_path(), &api_key, provider) {
        Ok(()) => {
            app.settings.api_key = if api_key.is_empty() { None } else { Some(api_key) };
            app.settings.provider = provider;
            app.set_status("Saved!", now);
        }
        Err(err) => app.set_status(format!("Save failed: {err}"), now),
    }
}

fn configured_key(app: &App) -> Option<String> {
    app.settings
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
}
