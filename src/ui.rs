use ratatui::{
    prelude::*,
    symbols,
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::markdown;
use crate::models::{ActiveTab, App, InputMode};
use crate::overlay::{OverlayContent, OverlayState, LOADING_TEXT};
use crate::scanner::{Complexity, ScanStatus};
use crate::theme::Theme;

pub fn render(f: &mut Frame, app: &App, theme: &Theme) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);

    render_tabs(f, app, theme, chunks[0]);
    match app.tab {
        ActiveTab::Ask => render_ask(f, app, theme, chunks[1]),
        ActiveTab::Repo => render_repo(f, app, theme, chunks[1]),
        ActiveTab::Settings => render_settings(f, app, theme, chunks[1]),
    }
    render_footer(f, app, theme, chunks[2]);
    render_overlay(f, app, theme);
}

fn render_tabs(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let titles = ["Ask [1]", "Repository [2]", "Settings [3]"];
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("codesplain"))
        .style(Style::default().fg(theme.text))
        .highlight_style(theme.tab_highlight)
        .select(app.tab.as_index())
        .divider(symbols::DOT)
        .padding(" ", " ");
    f.render_widget(tabs, area);
}

fn input_block<'a>(title: &'a str, active: bool, app: &App, theme: &Theme) -> Block<'a> {
    let editing = active && app.mode == InputMode::Editing;
    let color = if editing { theme.focus_border } else { theme.blurred_border };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(color))
}

fn render_ask(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(app.question.as_str())
        .style(Style::default().fg(theme.text))
        .block(input_block("Your Question", true, app, theme));
    f.render_widget(input, chunks[0]);

    let result_block = Block::default().title("Answer").borders(Borders::ALL);
    let result = if app.asking {
        Paragraph::new(LOADING_TEXT).style(theme.busy_text)
    } else {
        match &app.answer {
            Some(Ok(text)) => {
                Paragraph::new(Text::from(markdown::render(text, theme)))
                    .style(Style::default().fg(theme.text))
            }
            Some(Err(message)) => {
                Paragraph::new(format!("Error: {message}")).style(theme.error_text)
            }
            None => Paragraph::new("Type a question (i to edit), then press Enter.")
                .style(Style::default().fg(theme.text_secondary)),
        }
    };
    f.render_widget(result.wrap(Wrap { trim: false }).block(result_block), chunks[1]);
}

fn render_repo(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(app.repo_url.as_str())
        .style(Style::default().fg(theme.text))
        .block(input_block("Repository URL", true, app, theme));
    f.render_widget(input, chunks[0]);

    let block = Block::default().title("Repository Analysis").borders(Borders::ALL);
    let body: Paragraph = if app.scanning {
        Paragraph::new("Scanning repository...").style(theme.busy_text)
    } else {
        match &app.scan {
            None => Paragraph::new("Enter a GitHub repository URL and press Enter.")
                .style(Style::default().fg(theme.text_secondary)),
            Some(ScanStatus::NotRepoPage) => {
                Paragraph::new("Please navigate to a GitHub repository page.")
                    .style(Style::default().fg(theme.text_secondary))
            }
            Some(ScanStatus::Unavailable(reason)) => Paragraph::new(format!(
                "Could not load the page ({reason}). Check the URL and try again."
            ))
            .style(theme.error_text),
            Some(ScanStatus::Failed) => Paragraph::new(
                "Could not analyze this page. Make sure it is a repo code page.",
            )
            .style(Style::default().fg(theme.text_secondary)),
            Some(ScanStatus::Done(scan)) => {
                let complexity = Complexity::from_file_count(scan.file_count);
                let badge = match complexity {
                    Complexity::High => theme.badge_high,
                    Complexity::Medium => theme.badge_medium,
                    Complexity::Low => theme.badge_low,
                };
                let lines = vec![
                    Line::from(vec![
                        Span::styled("Files:      ", Style::default().fg(theme.text_secondary)),
                        Span::styled(
                            scan.file_count.to_string(),
                            Style::default().fg(theme.text_highlight),
                        ),
                    ]),
                    Line::from(vec![
                        Span::styled("Languages:  ", Style::default().fg(theme.text_secondary)),
                        Span::raw(scan.languages.clone()),
                    ]),
                    Line::from(vec![
                        Span::styled("Complexity: ", Style::default().fg(theme.text_secondary)),
                        Span::styled(complexity.label(), badge),
                    ]),
                ];
                Paragraph::new(lines).style(Style::default().fg(theme.text))
            }
        }
    };
    f.render_widget(body.wrap(Wrap { trim: false }).block(block), chunks[1]);
}

fn render_settings(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(app.api_key_input.as_str())
        .style(Style::default().fg(theme.text))
        .block(input_block("API Key", true, app, theme));
    f.render_widget(input, chunks[0]);

    let lines = vec![
        Line::from(vec![
            Span::styled("Provider: ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                app.provider_choice.label(),
                Style::default().fg(theme.text_highlight).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (p to toggle)", Style::default().fg(theme.text_secondary)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "The key is stored in ~/.config/codesplain/codesplain.toml.",
            Style::default().fg(theme.text_secondary),
        )),
    ];
    let body = Paragraph::new(lines)
        .block(Block::default().title("Settings").borders(Borders::ALL));
    f.render_widget(body, chunks[1]);
}

fn render_footer(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let hint = match app.mode {
        InputMode::Editing => "Esc Stop editing | Enter Submit".to_string(),
        InputMode::Normal => {
            "Tab/1/2/3 Sections | i Edit | Enter Submit | e Explain clipboard | p Provider | s Save | Esc Close popup | q Quit"
                .to_string()
        }
    };
    let mut spans = vec![Span::raw(hint)];
    if let Some((message, _)) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message.clone(), theme.status_line));
    }
    let footer = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .style(theme.footer);
    f.render_widget(footer, area);
}

fn render_overlay(f: &mut Frame, app: &App, theme: &Theme) {
    match app.overlay.state() {
        OverlayState::Absent => {}
        OverlayState::Open {
            title,
            content,
            scroll,
        } => {
            let popup_area = centered_rect(60, 80, f.area());
            f.render_widget(Clear, popup_area);
            let block = Block::default()
                .title(title.as_str())
                .borders(Borders::ALL)
                .style(theme.popup_border);
            let para = match content {
                OverlayContent::Loading => Paragraph::new(LOADING_TEXT)
                    .alignment(Alignment::Center)
                    .style(theme.busy_text),
                OverlayContent::Result(text) => {
                    Paragraph::new(Text::from(markdown::render(text, theme)))
                        .alignment(Alignment::Left)
                        .style(theme.popup_text)
                        .scroll((*scroll, 0))
                }
            };
            f.render_widget(para.block(block).wrap(Wrap { trim: false }), popup_area);

            // Hint row below the popup.
            let footer_area = Rect {
                x: popup_area.x,
                y: popup_area.y + popup_area.height,
                width: popup_area.width,
                height: 1,
            };
            let footer = Paragraph::new("Esc Close | j/k Scroll | c Copy to clipboard")
                .style(theme.footer);
            f.render_widget(footer, footer_area);
        }
        OverlayState::Closing { .. } => {
            // Reverse transition: an emptied, dimmed frame until detach.
            let popup_area = centered_rect(60, 80, f.area());
            f.render_widget(Clear, popup_area);
            let block = Block::default().borders(Borders::ALL).style(theme.popup_closing);
            f.render_widget(block, popup_area);
        }
    }
}

/// Centers a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r)[1];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical)[1]
}
