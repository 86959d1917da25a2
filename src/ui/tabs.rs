//! Tab bar for the visible tabs of a page

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs as RataTabs;
use ratatui::Frame;

use crate::session::render::TabView;

/// Draw the tab bar. Only visible tabs are passed in.
pub fn draw_tab_bar(f: &mut Frame, area: Rect, tabs: &[TabView]) {
    let titles: Vec<Line> = tabs
        .iter()
        .enumerate()
        .map(|(idx, tab)| {
            Line::from(vec![
                Span::styled(format!("{}:", idx + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(tab.tab.title()),
            ])
        })
        .collect();

    let selected = tabs.iter().position(|t| t.active).unwrap_or(0);

    let bar = RataTabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(bar, area);
}
