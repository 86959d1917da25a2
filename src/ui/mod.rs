use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod tabs;
pub mod widgets;

use crate::app::{App, InputMode, Screen, StatusLevel};
use crate::session::render::{ContractView, FieldValue, FieldView, ListBody, PageView, TableView};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    let view = app.page_view();
    draw_header(f, areas.header, app, view.as_ref());
    match (&app.screen, view.as_ref()) {
        (Screen::Page(_), Some(view)) => draw_page(f, areas.main, app, view),
        _ => draw_message(f, areas.main, app),
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, view: Option<&PageView>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let title = view
        .map(|v| v.title.clone())
        .unwrap_or_else(|| "Godwoken explorer".to_string());
    let left = Paragraph::new(Line::from(vec![
        Span::styled(
            "gwscope",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Left);

    let route = app
        .current_route()
        .map(|r| r.to_path())
        .unwrap_or_else(|| "--".to_string());
    let right = Paragraph::new(Line::from(vec![
        Span::styled("Route ", Style::default().fg(Color::DarkGray)),
        Span::raw(route),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_message(f: &mut Frame, area: Rect, app: &App) {
    let (title, lines, color) = match &app.screen {
        Screen::Empty => (
            "Welcome",
            vec![
                "Type : then a block number, address or hash.".to_string(),
                "Press ? for help.".to_string(),
            ],
            Color::White,
        ),
        Screen::Loading(route) => ("Loading", vec![format!("Loading {}...", route)], Color::Gray),
        Screen::NotFound(route) => (
            "404",
            vec![
                format!("Nothing found at {}", route),
                "Press b to go back.".to_string(),
            ],
            Color::LightYellow,
        ),
        Screen::Failed { route, message } => (
            "Error",
            vec![
                format!("Failed to load {}", route),
                message.clone(),
                "Press r to retry or b to go back.".to_string(),
            ],
            Color::LightRed,
        ),
        Screen::Page(_) => ("", Vec::new(), Color::White),
    };

    let text = Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>());
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_page(f: &mut Frame, area: Rect, app: &App, view: &PageView) {
    let page = layout::page_areas(area, view.fields.len());

    draw_fields(f, page.fields, &view.fields);
    tabs::draw_tab_bar(f, page.tabs, &view.tabs);

    match &view.body {
        ListBody::Table(table) => {
            draw_table(f, page.list, table, app.selected_row);
            f.render_widget(widgets::Pager::new(&table.pagination), page.pager);
        }
        ListBody::Contract(contract) => draw_contract(f, page.list, contract),
        ListBody::Loading => draw_placeholder(f, page.list, "Loading...", Color::Gray),
        ListBody::Empty => draw_placeholder(f, page.list, "No records", Color::DarkGray),
        ListBody::Failed(message) => draw_placeholder(
            f,
            page.list,
            &format!("Load failed: {}", message),
            Color::LightRed,
        ),
    }
}

fn draw_fields(f: &mut Frame, area: Rect, fields: &[FieldView]) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(Block::default().borders(Borders::ALL).inner(area));
    f.render_widget(Block::default().borders(Borders::ALL), area);

    let half = fields.len().div_ceil(2);
    for (column, chunk) in fields.chunks(half.max(1)).enumerate() {
        let lines: Vec<Line> = chunk.iter().map(field_line).collect();
        if let Some(target) = columns.get(column) {
            f.render_widget(Paragraph::new(lines), *target);
        }
    }
}

fn field_line(field: &FieldView) -> Line<'static> {
    let value_style = match &field.value {
        FieldValue::Link { .. } => Style::default().fg(Color::LightCyan),
        FieldValue::External { .. } => Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::UNDERLINED),
        FieldValue::Loading | FieldValue::Placeholder => Style::default().fg(Color::DarkGray),
        FieldValue::Pending => Style::default().fg(Color::LightYellow),
        FieldValue::Text(_) => Style::default().fg(Color::White),
    };
    Line::from(vec![
        Span::styled(format!("{:<18}", field.label), Style::default().fg(Color::DarkGray)),
        Span::styled(field.value.text().to_string(), value_style),
    ])
}

fn draw_table(f: &mut Frame, area: Rect, table: &TableView, selected: usize) {
    let header = Row::new(
        table
            .columns
            .iter()
            .map(|c| Cell::from(*c).style(Style::default().fg(Color::DarkGray))),
    );
    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|c| Cell::from(c.clone()))))
        .collect();
    let widths: Vec<Constraint> = table
        .columns
        .iter()
        .map(|_| Constraint::Ratio(1, table.columns.len().max(1) as u32))
        .collect();

    let widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !table.rows.is_empty() {
        state.select(Some(selected.min(table.rows.len() - 1)));
    }
    f.render_stateful_widget(widget, area, &mut state);
}

fn draw_contract(f: &mut Frame, area: Rect, contract: &ContractView) {
    let label = |text: &str| Span::styled(format!("{:<12}", text), Style::default().fg(Color::DarkGray));
    let mut lines = vec![
        Line::from(vec![
            label("Name"),
            Span::raw(contract.name.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            label("Compiler"),
            Span::raw(contract.compiler.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            label("Verified"),
            if contract.verified {
                Span::styled("yes", Style::default().fg(Color::LightGreen))
            } else {
                Span::styled("no  (:verify to check Sourcify)", Style::default().fg(Color::LightYellow))
            },
        ]),
    ];
    if let Some(err) = &contract.abi_error {
        lines.push(Line::from(Span::styled(
            format!("ABI unreadable: {}", err),
            Style::default().fg(Color::LightRed),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Functions", Style::default().add_modifier(Modifier::BOLD))));
    lines.extend(contract.functions.iter().map(|sig| Line::from(format!("  {}", sig))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Events", Style::default().add_modifier(Modifier::BOLD))));
    lines.extend(contract.events.iter().map(|sig| Line::from(format!("  {}", sig))));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("History ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.history_len())),
    ];
    if let Some(session) = app.session() {
        if let Some(tab) = session.active_tab() {
            spans.push(Span::styled("Tab ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw(format!("{}  ", tab.title())));
        }
        if session.list().is_loading() {
            spans.push(Span::styled("fetching", Style::default().fg(Color::Yellow)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("open", "Open a route: /block/5?tab=bridged"),
        ("account", "Open an account by address or script hash"),
        ("block", "Open a block by number or hash"),
        ("token", "Open a token by id or address"),
        ("tab", "Switch tab: transactions erc20 transfers activity bridged assets contract events"),
        ("next", "Next page"),
        ("prev", "Previous page"),
        ("first", "First page"),
        ("range", "Filter transactions by block: range <from> <to>"),
        ("item", "NFT activity for one token id: item <id>"),
        ("refresh", "Refetch the page"),
        ("copy", "Copy the entity id"),
        ("export", "Export the active tab"),
        ("verify", "Verify the contract on Sourcify"),
        ("back", "Go back"),
        ("help", "Show key bindings"),
        ("quit", "Quit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("search: block number / hash / address");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints()
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints() -> Line<'static> {
    let hints = [
        ("Tab", "tabs"),
        ("n/p", "page"),
        ("j/k", "select"),
        ("Enter", "open"),
        ("b", "back"),
        (":", "command"),
        ("?", "help"),
    ];
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(
            format!(" {}  ", label),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(72, 64, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Keys"),
        Line::from("  Tab / S-Tab  Cycle tabs"),
        Line::from("  n / p        Next / previous page"),
        Line::from("  j / k        Move selection"),
        Line::from("  Enter        Open selected row"),
        Line::from("  r            Refresh"),
        Line::from("  y            Copy id"),
        Line::from("  e            Export tab"),
        Line::from("  b / Bksp     Back"),
        Line::from("  :            Command line"),
        Line::from("  ?            Toggle help"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :open /account/0x..?tab=erc20&page=2"),
        Line::from("  :block 12345    :account 0x..    :token 1"),
        Line::from("  :tab bridged    :next    :prev    :first"),
        Line::from("  :range 100 200  (account transactions by block)"),
        Line::from("  :item 42        (NFT activity for one token id)"),
        Line::from("  :verify         (unverified contracts)"),
        Line::from(""),
        Line::from("Search: bare input opens a block (number or 0x<64 hex>) or an account"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_hint_prefix() {
        assert_eq!(command_hint("ver"), Some("Verify the contract on Sourcify"));
        assert_eq!(command_hint(""), None);
        assert_eq!(command_hint("zzz"), None);
    }

    #[test]
    fn test_field_line_uses_text() {
        let line = field_line(&FieldView {
            label: "Status",
            value: FieldValue::Pending,
        });
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(rendered.starts_with("Status"));
        assert!(rendered.ends_with("pending"));
    }
}
