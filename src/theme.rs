use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_highlight: Color,

    // Specific components
    pub tab_highlight: Style,
    pub footer: Style,
    pub status_line: Style,
    pub error_text: Style,
    pub busy_text: Style,
    pub popup_border: Style,
    pub popup_closing: Style,
    pub popup_text: Style,
    pub badge_high: Style,
    pub badge_medium: Style,
    pub badge_low: Style,

    // Markdown-lite rendering
    pub md_heading2: Style,
    pub md_heading3: Style,
    pub md_bold: Style,
    pub md_inline_code: Style,
    pub md_code_block: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            text: Color::White,
            text_secondary: Color::Gray,
            text_highlight: Color::Yellow,

            tab_highlight: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            status_line: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            error_text: Style::default().fg(Color::Red),
            busy_text: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            popup_border: Style::default().fg(Color::Magenta).bg(Color::Black),
            popup_closing: Style::default().fg(Color::DarkGray).bg(Color::Black),
            popup_text: Style::default().fg(Color::White),
            badge_high: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            badge_medium: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            badge_low: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),

            md_heading2: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            md_heading3: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            md_bold: Style::default().add_modifier(Modifier::BOLD),
            md_inline_code: Style::default().fg(Color::Yellow),
            md_code_block: Style::default().fg(Color::Green).bg(Color::Rgb(30, 30, 30)),
        }
    }
}
