use anyhow::Result;

/// Visible content rows inside the overlay popup for a terminal of `rows`.
/// The popup takes 80% of the screen height; two rows go to the border.
pub fn overlay_view_height(rows: u16) -> u16 {
    ((rows as u32) * 80 / 100).saturating_sub(2) as u16
}

pub fn max_scroll(content_lines: usize, view_height: u16) -> u16 {
    let content = content_lines.min(u16::MAX as usize) as u16;
    content.saturating_sub(view_height)
}

pub fn overlay_scroll_max(content_lines: usize) -> Result<u16> {
    let (_cols, rows) = crossterm::terminal::size()?;
    Ok(max_scroll(content_lines, overlay_view_height(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_does_not_scroll() {
        assert_eq!(max_scroll(5, 20), 0);
        assert_eq!(max_scroll(20, 20), 0);
    }

    #[test]
    fn long_content_scrolls_by_the_overflow() {
        assert_eq!(max_scroll(25, 20), 5);
    }

    #[test]
    fn view_height_accounts_for_borders() {
        assert_eq!(overlay_view_height(50), 38);
        assert_eq!(overlay_view_height(0), 0);
    }
}
