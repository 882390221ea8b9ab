use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::AppConfig;
use crate::numbering;
use super::app::App;
use super::models::{InputMode, StatusLevel};

pub fn ui(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(7),
        ])
        .split(size);

    render_header(f, chunks[0], app);
    render_file_panes(f, chunks[1], app);
    render_settings(f, chunks[2], app);
    render_numbering_info(f, chunks[3], app);
    render_activity(f, chunks[4], app);

    match app.input_mode {
        InputMode::AddPath => render_input_popup(f, "Add file (Enter to add, Esc to cancel)", &app.input),
        InputMode::OutputDir => {
            render_input_popup(f, "Output directory (empty = rename in place)", &app.input)
        }
        InputMode::ConfirmRename => render_confirm_popup(f),
        InputMode::Normal => {}
    }

    if app.show_help {
        render_help_popup(f);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("{} - Your files: {}", AppConfig::APP_NAME, app.manager.count());
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn render_file_panes(f: &mut Frame, area: Rect, app: &mut App) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let items: Vec<ListItem> = app
        .manager
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let name = entry.display_name();
            let mut spans = vec![Span::styled(
                format!("{:>3}. ", i + 1),
                Style::default().fg(Color::DarkGray),
            )];
            if numbering::is_numbered(name) {
                spans.push(Span::styled(name.to_string(), Style::default().fg(Color::Yellow)));
            } else {
                spans.push(Span::raw(name.to_string()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Files"))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, panes[0], &mut app.list_state);

    let preview: Vec<ListItem> = app
        .manager
        .preview_names(app.start_number)
        .into_iter()
        .map(|name| ListItem::new(Span::styled(name, Style::default().fg(Color::Green))))
        .collect();
    let preview_title = match &app.output_dir {
        Some(_) => "New names (copies)",
        None => "New names (in place)",
    };
    let preview_list = List::new(preview)
        .block(Block::default().borders(Borders::ALL).title(preview_title));
    let mut preview_state = app.list_state.clone();
    f.render_stateful_widget(preview_list, panes[1], &mut preview_state);
}

fn render_settings(f: &mut Frame, area: Rect, app: &App) {
    let target = match &app.output_dir {
        Some(dir) => format!("copy to {}", dir.display()),
        None => "rename in place".to_string(),
    };
    let line = Line::from(vec![
        Span::raw("Start number: "),
        Span::styled(
            app.start_number.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Output: "),
        Span::styled(target, Style::default().fg(Color::Cyan)),
    ]);
    let settings = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(settings, area);
}

fn render_numbering_info(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match app.numbering_info() {
        Some(text) => (text, Style::default().fg(Color::Blue)),
        None => ("No existing numbering detected".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let info = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Numbering"));
    f.render_widget(info, area);
}

fn render_activity(f: &mut Frame, area: Rect, app: &App) {
    let inner_rows = area.height.saturating_sub(3) as usize;
    let mut lines: Vec<Line> = app
        .event_log
        .recent(inner_rows)
        .iter()
        .map(|event| Line::from(Span::styled(event.to_string(), Style::default().fg(Color::Gray))))
        .collect();

    let status = match &app.status_message {
        Some(message) => {
            let color = match message.level {
                StatusLevel::Info => Color::Green,
                StatusLevel::Warning => Color::Yellow,
                StatusLevel::Error => Color::Red,
            };
            Line::from(Span::styled(
                message.text.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(Span::styled(
            "a add | d remove | K/J move | +/- start | o output | r rename | h help | q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    lines.push(status);

    let activity = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Activity"));
    f.render_widget(activity, area);
}

fn render_input_popup(f: &mut Frame, title: &str, input: &str) {
    let area = centered_rect(70, 15, f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(format!("{input}_"))
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(popup, area);
}

fn render_confirm_popup(f: &mut Frame) {
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);
    let text = vec![
        Line::from("Some files already carry a number."),
        Line::from("The old numbering will be replaced with the new one."),
        Line::from(""),
        Line::from(Span::styled(
            "Continue? (y/n)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm rename")
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(popup, area);
}

fn render_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from("↑/↓ or k/j      Select file"),
        Line::from("Shift+↑/↓, K/J  Move selected file"),
        Line::from("a               Add a file by path"),
        Line::from("d / Delete      Remove selected file"),
        Line::from("c               Clear the list"),
        Line::from("+/- or →/←      Change start number"),
        Line::from("o               Set output directory for copies"),
        Line::from("r / Enter       Number the files"),
        Line::from("h               Toggle this help"),
        Line::from("q / Esc         Quit"),
    ];

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(help, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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
