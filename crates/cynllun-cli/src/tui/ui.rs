//! Wizard TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use cynllun_core::selection::Duration;
use cynllun_core::summary;
use cynllun_core::wizard::{STEPS, StepId};

use super::app::{App, FormField, Mode};

/// Render the current frame.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // progress header
            Constraint::Min(5),   // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_progress(f, app, chunks[0]);

    match app.current_step() {
        StepId::Setting => render_setting(f, app, chunks[1]),
        StepId::Plan => render_plan(f, app, chunks[1]),
        _ => render_pick(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);

    match app.mode {
        Mode::Detail => render_detail(f, app),
        Mode::Register => render_register(f, app),
        Mode::Wizard => {}
    }
}

fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let current = app.session.cursor.pos();
    let mut spans = Vec::new();
    for (i, step) in STEPS.iter().enumerate() {
        let style = if i == current {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if i < current {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let ready = step.id.is_ready(&app.session.selection);
        let marker = if ready { "" } else { "!" };
        spans.push(Span::styled(format!("{} {}{}", i + 1, step.label, marker), style));
        if i < STEPS.len() - 1 {
            spans.push(Span::raw("  "));
        }
    }

    let header = vec![
        Line::from(spans),
        Line::from(Span::styled(
            format!("Step {} of {} — {}", current + 1, STEPS.len(), STEPS[current].label),
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(Paragraph::new(header), area);
}

fn render_setting(f: &mut Frame, app: &App, area: Rect) {
    let setting = &app.session.selection.setting;
    let step_label = setting
        .progression_step
        .and_then(|n| app.catalog.progression_step(n))
        .map(|p| p.label())
        .unwrap_or_else(|| "(space to cycle)".to_string());

    let field = |focused: bool, label: &str, value: String| {
        let marker = if focused { "▸ " } else { "  " };
        let style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(marker.to_string()),
            Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
            Span::styled(value, style),
        ])
    };

    let lines = vec![
        Line::from("Set the scene: describe your learning context."),
        Line::from(""),
        field(app.form_focus == FormField::Topic, "Topic or theme", setting.topic.clone()),
        field(app.form_focus == FormField::Step, "Progression step", step_label),
        field(
            app.form_focus == FormField::Duration,
            "Duration",
            Duration::label_opt(setting.duration).to_string(),
        ),
        field(
            app.form_focus == FormField::Context,
            "Additional context",
            setting.context.clone(),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Tab next field · Space cycles choices · type to edit · → next step",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title(" 📍 Setting ");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_pick(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    // Chip summary of purposes and areas picked so far.
    let chips = summary::chip_summary(&app.session.selection, app.catalog);
    let chip_line = if chips.is_empty() {
        Line::from(Span::styled("Nothing selected yet", Style::default().fg(Color::DarkGray)))
    } else {
        let mut spans = vec![Span::raw("Selected: ")];
        for chip in &chips {
            spans.push(Span::styled(
                format!("[{}] ", chip.label),
                Style::default().fg(Color::Cyan),
            ));
        }
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(chip_line), chunks[0]);

    let cards = app.step_cards();
    let step = app.session.cursor.step();

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let mark = if card.selected { "✓" } else { " " };
            let title_style = if card.selected {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(format!("[{mark}] ")),
                    Span::styled(card.title.clone(), title_style),
                    Span::styled(
                        format!("  ({})", card.category),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("     {}", card.summary),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let title = format!(" {} {} ", step.icon, step.label);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !cards.is_empty() {
        state.select(Some(app.selected_card.min(cards.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    if cards.is_empty() && app.current_step() == StepId::Statements {
        let hint = Paragraph::new("No Areas selected yet. Go back to Step 3 to choose Areas.")
            .style(Style::default().fg(Color::Yellow));
        let inner = chunks[1].inner(ratatui::layout::Margin { horizontal: 2, vertical: 2 });
        f.render_widget(hint, inner);
    }
}

fn render_plan(f: &mut Frame, app: &App, area: Rect) {
    let doc = summary::full_summary(&app.session.selection, app.catalog);

    let mut lines: Vec<Line> = Vec::new();
    for section in &doc.sections {
        lines.push(Line::from(Span::styled(
            section.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for card in &section.cards {
            lines.push(Line::from(Span::styled(
                format!("  {}", card.title),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for body in &card.body {
                lines.push(Line::from(format!("    {body}")));
            }
        }
        lines.push(Line::from(""));
    }

    if app.loading {
        lines.push(Line::from(Span::styled(
            "Generating creative activity ideas… this may take a moment ✨",
            Style::default().fg(Color::Yellow),
        )));
    } else if !app.activity_cards.is_empty() {
        lines.push(Line::from(Span::styled(
            "✨ AI-Generated Activity Ideas",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        for card in &app.activity_cards {
            lines.push(Line::from(Span::styled(
                format!("  {}", card.title),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for body in &card.body {
                lines.push(Line::from(format!("    {body}")));
            }
        }
    } else if let Some(text) = app.session.enhancement() {
        // Parser found no structure: verbatim fallback display.
        lines.push(Line::from(Span::styled(
            "✨ AI-Generated Activity Ideas",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        for raw in text.lines() {
            lines.push(Line::from(format!("  {raw}")));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ✨ Review & Generate ");
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0)),
        area,
    );
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.loading {
        "Generating…".to_string()
    } else {
        match app.current_step() {
            StepId::Setting => "←/→ steps · Esc quit".to_string(),
            StepId::Plan => {
                "g generate activities · s save plan · r register · j/k scroll · ←/→ steps".to_string()
            }
            _ => "Space select · Enter details · j/k move · ←/→ steps · 1-8 revisit".to_string(),
        }
    };
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray))),
        area,
    );
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn render_detail(f: &mut Frame, app: &App) {
    let cards = app.step_cards();
    let Some(card) = cards.get(app.selected_card) else {
        return;
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            card.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            card.category.clone(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
    ];
    for detail in detail_lines(app, &card.id) {
        lines.push(Line::from(detail));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc to close",
        Style::default().fg(Color::DarkGray),
    )));

    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Details "))
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Full detail text for a card, resolved from the catalog by id.
fn detail_lines(app: &App, id: &str) -> Vec<String> {
    let catalog = app.catalog;
    match app.current_step() {
        StepId::Purpose => catalog
            .purpose(id)
            .map(|p| {
                let mut lines = vec![p.subtitle.clone(), String::new(), "Key characteristics:".to_string()];
                lines.extend(p.characteristics.iter().map(|c| format!("• {c}")));
                lines
            })
            .unwrap_or_default(),
        StepId::Area => catalog
            .area(id)
            .map(|a| {
                let mut lines = vec![
                    a.introduction.clone(),
                    String::new(),
                    format!("Statements of What Matters ({}):", a.statements.len()),
                ];
                lines.extend(a.statements.iter().map(|s| format!("• {} — {}", s.title, s.summary)));
                lines
            })
            .unwrap_or_default(),
        StepId::Statements => catalog
            .statement(id)
            .map(|(_, s)| {
                let mut lines = vec![s.summary.clone(), String::new(), s.description.clone()];
                append_good_with(catalog, &mut lines, &s.good_with);
                lines
            })
            .unwrap_or_default(),
        StepId::Skills => catalog
            .skill(id)
            .map(|sk| {
                let mut lines = vec![sk.description.clone()];
                if !sk.elements.is_empty() {
                    lines.push(String::new());
                    lines.push("Elements:".to_string());
                    lines.extend(sk.elements.iter().map(|e| format!("• {e}")));
                }
                lines
            })
            .unwrap_or_default(),
        StepId::Teaching => catalog
            .teaching_method(id)
            .map(|m| {
                let mut lines = vec![m.description.clone(), String::new(), "Steps:".to_string()];
                lines.extend(m.steps.iter().enumerate().map(|(i, s)| format!("{}. {s}", i + 1)));
                lines.push(String::new());
                lines.push(format!("Welsh context: {}", m.welsh_context));
                append_good_with(catalog, &mut lines, &m.good_with);
                append_good_with(catalog, &mut lines, &m.good_with_methods);
                lines
            })
            .unwrap_or_default(),
        StepId::Assessment => catalog
            .assessment_method(id)
            .map(|m| {
                let mut lines = vec![
                    m.description.clone(),
                    String::new(),
                    format!("Approach: {}", m.approach),
                    format!("Welsh context: {}", m.welsh_context),
                ];
                append_good_with(catalog, &mut lines, &m.good_with);
                lines
            })
            .unwrap_or_default(),
        StepId::Setting | StepId::Plan => Vec::new(),
    }
}

fn append_good_with(
    catalog: &cynllun_core::catalog::Catalog,
    lines: &mut Vec<String>,
    ids: &[String],
) {
    let resolved: Vec<String> = ids
        .iter()
        .filter_map(|gw| catalog.cross_reference(gw))
        .map(|(label, _color)| label)
        .collect();
    if !resolved.is_empty() {
        lines.push(String::new());
        lines.push(format!("Good with: {}", resolved.join(" · ")));
    }
}

fn render_register(f: &mut Frame, app: &App) {
    let labels = ["Name", "Email", "School (optional)"];
    let mut lines = vec![
        Line::from("Register to download plans and generate activities."),
        Line::from(""),
    ];
    for (i, label) in labels.iter().enumerate() {
        let marker = if i == app.register_focus { "▸ " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw(marker.to_string()),
            Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
            Span::raw(app.register_fields[i].clone()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter submit · Tab next field · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Registration "))
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Centered sub-rectangle taking the given percentages of the frame.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
