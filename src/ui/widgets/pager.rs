//! Single-line pagination footer for list tables

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::format::format_int;
use crate::session::render::Pagination;

/// `‹ prev  page 2 / 7  next ›  1,234 total`, with unavailable arrows dimmed
pub struct Pager<'a> {
    pagination: &'a Pagination,
    style: Style,
    dim: Style,
}

impl<'a> Pager<'a> {
    pub fn new(pagination: &'a Pagination) -> Self {
        Self {
            pagination,
            style: Style::default().fg(Color::Cyan),
            dim: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl<'a> Widget for Pager<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let prev_style = if self.pagination.has_prev { self.style } else { self.dim };
        let next_style = if self.pagination.has_next { self.style } else { self.dim };

        let mut x = area.x;
        let right = area.x + area.width;
        for (text, style) in [
            ("‹ prev  ".to_string(), prev_style),
            (page_label(self.pagination), self.dim),
            ("next ›  ".to_string(), next_style),
            (total_label(self.pagination), self.dim),
        ] {
            if x >= right {
                break;
            }
            let (next_x, _) = buf.set_stringn(x, area.y, &text, (right - x) as usize, style);
            x = next_x;
        }
    }
}

fn page_label(pagination: &Pagination) -> String {
    match (pagination.page, pagination.last_page) {
        (Some(page), Some(last)) => format!("page {} / {}  ", page, last),
        _ => String::new(),
    }
}

fn total_label(pagination: &Pagination) -> String {
    format!("{} total", format_int(pagination.total_count))
}
