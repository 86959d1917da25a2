use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub main: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

/// Page body split: entity fields, tab bar, list table, pager
#[derive(Debug, Clone, Copy)]
pub struct PageAreas {
    pub fields: Rect,
    pub tabs: Rect,
    pub list: Rect,
    pub pager: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        main: vertical[1],
        status_line: footer_chunks[0],
        command_line: footer_chunks[1],
    }
}

/// Fields get their rows (two columns) plus borders, capped at half the body
pub fn page_areas(main: Rect, field_count: usize) -> PageAreas {
    let field_rows = field_count.div_ceil(2) as u16 + 2;
    let field_rows = field_rows.min(main.height / 2).max(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(field_rows),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(main);

    PageAreas {
        fields: chunks[0],
        tabs: chunks[1],
        list: chunks[2],
        pager: chunks[3],
    }
}
