use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, CopyField, Field, ReferralPane, Screen, Tab, ToastKind};
use crate::controllers::messages::MessageCategory;
use crate::controllers::withdrawals::NoteField;
use crate::controllers::{LoadState, Phase};
use crate::normalize::dates::{created_line, format_date_time};
use crate::normalize::{LevelExpansion, UserView, WithdrawalFilter};
use crate::theme::ColorScheme;

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &App) {
    let c = app.theme().colors();
    f.render_widget(Block::default().style(Style::default().bg(c.background).fg(c.text)), f.area());

    match app.screen() {
        Screen::Signup | Screen::Login => auth_screen(f, app, &c),
        Screen::Dashboard => dashboard(f, app, &c),
    }

    if app.toast_message().is_some() {
        draw_toast_modal(f, app, &c);
    }
}

fn dashboard(f: &mut Frame, app: &App, c: &ColorScheme) {
    let show_debug = app.debug_visible() && !app.debug_log().is_empty();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(4);
    constraints.push(Constraint::Length(2)); // header
    constraints.push(Constraint::Min(0)); // body
    if show_debug {
        constraints.push(Constraint::Length(6));
    }
    constraints.push(Constraint::Length(2)); // footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], app, c);
    idx += 1;

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(0)])
        .split(chunks[idx]);
    sidebar(f, body[0], app, c);
    match app.tab() {
        Tab::Home => home_tab(f, body[1], app, c),
        Tab::Messages => messages_tab(f, body[1], app, c),
        Tab::Users => users_tab(f, body[1], app, c),
        Tab::Referrals => referrals_tab(f, body[1], app, c),
        Tab::Withdrawals => withdrawals_tab(f, body[1], app, c),
        other => coming_soon(f, body[1], other, c),
    }
    idx += 1;

    if show_debug {
        debug_panel(f, chunks[idx], app, c);
        idx += 1;
    }
    footer(f, chunks[idx], app, c);
}

// ===============================
// Header / Sidebar / Footer
// ===============================
fn header(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let who = app.session().map(|s| s.profile.display().to_string()).unwrap_or_default();
    let line = Line::from(vec![
        Span::styled("JustStock", Style::default().fg(c.focus_border).add_modifier(Modifier::BOLD)),
        Span::raw(" Admin  │  "),
        Span::styled(app.tab().label(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  │  "),
        Span::styled(who, Style::default().fg(c.text_dim)),
    ]);
    let w = Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM).border_type(BorderType::Plain));
    f.render_widget(w, area);
}

fn sidebar(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let items: Vec<ListItem> = Tab::ALL
        .iter()
        .map(|t| {
            if t.enabled() {
                ListItem::new(format!(" {}", t.label()))
            } else {
                ListItem::new(Line::from(vec![
                    Span::raw(format!(" {:<11}", t.label())),
                    Span::styled("Soon", Style::default().fg(c.disabled).add_modifier(Modifier::ITALIC)),
                ]))
                .style(Style::default().fg(c.disabled))
            }
        })
        .collect();

    let mut st = ListState::default();
    st.select(Tab::ALL.iter().position(|t| *t == app.tab()));
    let list = List::new(items)
        .highlight_style(Style::default().bg(c.selection_bg).fg(c.selection_fg).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(c.unfocused_border)),
        );
    f.render_stateful_widget(list, area, &mut st);
}

fn footer(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(c.focus_border));
    let mut spans: Vec<Span> = Vec::with_capacity(32);

    if let Some(field) = app.editing() {
        spans.push(Span::styled(format!("Editing {}", field.label()), Style::default().fg(c.focus_border)));
        spans.push(Span::raw(" │ "));
        spans.push(key("Enter"));
        spans.push(Span::raw(" done │ "));
        spans.push(key("Esc"));
        spans.push(Span::raw(" cancel"));
    } else {
        spans.push(key("Tab"));
        spans.push(Span::raw(" switch │ "));
        for (k, label) in tab_hints(app.tab()) {
            spans.push(key(k));
            spans.push(Span::raw(format!(" {label} │ ")));
        }
        spans.push(key("r"));
        spans.push(Span::raw(" refresh │ "));
        spans.push(key("L"));
        spans.push(Span::raw(" logout │ "));
        spans.push(key("Ctrl+D"));
        spans.push(Span::raw(" debug │ "));
        spans.push(key("q"));
        spans.push(Span::raw(" quit"));
    }

    if app.debug_visible() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("[DEBUG]", Style::default().fg(c.debug_indicator)));
    }

    let w = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP).border_type(BorderType::Plain));
    f.render_widget(w, area);
}

fn tab_hints(tab: Tab) -> &'static [(&'static str, &'static str)] {
    match tab {
        Tab::Home => &[("E", "export wallet CSV")],
        Tab::Users => &[("/", "search"), ("←/→", "page"), ("s", "page size"), ("Enter", "referrals"), ("E", "export phones")],
        Tab::Referrals => &[("/", "find"), ("←/→", "pane"), ("Enter", "pick/expand"), ("n", "non-paid")],
        Tab::Withdrawals => &[
            ("f", "filter"),
            ("/", "user"),
            ("p", "paid"),
            ("x", "cancel"),
            ("e", "ref"),
            ("o", "note"),
            ("a/i/u", "copy"),
            ("E", "export"),
        ],
        Tab::Messages => &[("↑/↓", "field"), ("Enter", "edit"), ("c", "category"), ("t", "type"), ("s", "send")],
        _ => &[],
    }
}

fn debug_panel(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let log = app.debug_log();
    let lines_to_show = (area.height.saturating_sub(2)) as usize;
    let start = log.len().saturating_sub(lines_to_show);
    let lines: Vec<Line> = log[start..].iter().map(|msg| Line::from(Span::raw(msg.as_str()))).collect();

    let paragraph = Paragraph::new(lines).style(Style::default().fg(c.text_dim)).block(
        Block::default()
            .title(" Debug ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(c.text_dim)),
    );
    f.render_widget(paragraph, area);
}

// ===============================
// Auth
// ===============================
fn auth_screen(f: &mut Frame, app: &App, c: &ColorScheme) {
    let fields = app.auth_fields();
    let title = if app.screen() == Screen::Signup { " Create admin account " } else { " Admin sign in " };

    let area = f.area();
    let width = area.width.min(60);
    let height = (fields.len() as u16 * 3 + 6).min(area.height);
    let overlay = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let container = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(c.focus_border));
    let inner = container.inner(overlay);
    f.render_widget(container, overlay);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default().direction(Direction::Vertical).constraints(constraints).split(inner);

    for (i, field) in fields.iter().enumerate() {
        input_box(f, rows[i], app, *field, c);
    }

    let status = if app.auth().is_submitting() {
        Line::from(Span::styled("Submitting...", Style::default().fg(c.text_dim)))
    } else if let Some(err) = app.auth().error() {
        Line::from(Span::styled(err, Style::default().fg(c.toast_error)))
    } else {
        Line::default()
    };
    f.render_widget(Paragraph::new(status), rows[fields.len()]);

    let switch = if app.screen() == Screen::Signup { " have an account? sign in" } else { " create an account" };
    let help = Line::from(vec![
        Span::styled("Tab", Style::default().fg(c.focus_border)),
        Span::raw(" next  "),
        Span::styled("Enter", Style::default().fg(c.focus_border)),
        Span::raw(" submit  "),
        Span::styled("Ctrl+S", Style::default().fg(c.focus_border)),
        Span::raw(switch),
        Span::raw("  "),
        Span::styled("Esc", Style::default().fg(c.focus_border)),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(help).wrap(Wrap { trim: true }), rows[fields.len() + 1]);
}

fn input_box(f: &mut Frame, area: Rect, app: &App, field: Field, c: &ColorScheme) {
    let focused = app.editing() == Some(field);
    let raw = app.field_text(field);
    let text = if field.is_secret() { "•".repeat(raw.chars().count()) } else { raw.to_string() };
    let border = if focused { c.focus_border } else { c.unfocused_border };

    let w = Paragraph::new(text.as_str()).block(
        Block::default()
            .title(format!(" {} ", field.label()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(w, area);

    if focused && area.width > 2 {
        let x = area.x + 1 + (text.chars().count().min(area.width.saturating_sub(2) as usize) as u16);
        f.set_cursor_position((x, area.y + 1));
    }
}

// ===============================
// Tabs
// ===============================
fn home_tab(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let home = app.home();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    f.render_widget(Paragraph::new(status_line(&home.overview, "Overview", c)), rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[1]);

    let cards = home.overview.data().cloned().unwrap_or_default().cards();
    for (card, col) in cards.iter().zip(cols.iter()) {
        let value = if home.show_loading_placeholder() { "..." } else { card.value.as_str() };
        let body = vec![
            Line::from(Span::styled(value.to_string(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(card.note.clone(), Style::default().fg(c.text_dim))),
        ];
        let w = Paragraph::new(body).block(
            Block::default()
                .title(format!(" {} ", card.label))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(c.unfocused_border)),
        );
        f.render_widget(w, *col);
    }
}

fn users_tab(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let users = app.users();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    input_box(f, rows[0], app, Field::UsersSearch, c);

    let summary = format!(
        "Page {} of {} · {} per page · {} users",
        users.page(),
        users.total_pages(),
        users.limit(),
        users.total()
    );
    let mut line = status_line(&users.list, "Users", c);
    line.spans.push(Span::styled(format!("  {summary}"), Style::default().fg(c.text_dim)));
    f.render_widget(Paragraph::new(line), rows[1]);

    let items: Vec<ListItem> = users.items().iter().map(|u| user_item(u, c)).collect();
    let mut st = ListState::default();
    if !items.is_empty() {
        st.select(Some(users.selected()));
    }
    let list = List::new(items)
        .highlight_style(Style::default().bg(c.selection_bg).fg(c.selection_fg))
        .block(bordered(" Users ", c.focus_border));
    f.render_stateful_widget(list, rows[2], &mut st);
}

fn user_item<'a>(u: &UserView, c: &ColorScheme) -> ListItem<'a> {
    let mut first = vec![Span::styled(u.display_name().to_string(), Style::default().add_modifier(Modifier::BOLD))];
    if let Some(label) = u.activity.label() {
        first.push(Span::raw("  "));
        first.push(Span::styled(format!("[{label}]"), Style::default().fg(c.activity(u.activity))));
    }
    for chip in u.chips() {
        first.push(Span::raw("  "));
        first.push(Span::styled(format!("{}: {}", chip.label, chip.value), Style::default().fg(c.chip)));
    }
    let second = Line::from(vec![
        Span::styled(format!("  {}", u.contact_line()), Style::default().fg(c.text_dim)),
        Span::styled(format!("  {}", created_line(u.created_at.as_ref())), Style::default().fg(c.text_dim)),
    ]);
    ListItem::new(vec![Line::from(first), second])
}

fn referrals_tab(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let r = app.referrals();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    // Left: search
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
        .split(cols[0]);
    input_box(f, left[0], app, Field::ReferralSearch, c);
    f.render_widget(Paragraph::new(status_line(&r.results, "Results", c)), left[1]);

    let items: Vec<ListItem> = r.results().iter().map(|u| user_item(u, c)).collect();
    let mut st = ListState::default();
    if !items.is_empty() {
        st.select(Some(r.selected_result()));
    }
    let search_focused = app.referral_pane() == ReferralPane::Search;
    let list = List::new(items)
        .highlight_style(Style::default().bg(c.selection_bg).fg(c.selection_fg))
        .block(bordered(" Search results ", pane_color(search_focused, c)));
    f.render_stateful_widget(list, left[2], &mut st);

    if app.referral_pane() == ReferralPane::NonPaid {
        non_paid_pane(f, cols[1], app, c);
        return;
    }

    // Right: tree
    let title = match r.root_name() {
        Some(name) => format!(" Referral tree · {name} (depth {}) ", r.depth()),
        None => " Referral tree ".to_string(),
    };
    let tree_focused = app.referral_pane() == ReferralPane::Tree;
    let block = bordered(&title, pane_color(tree_focused, c));
    let inner = block.inner(cols[1]);
    f.render_widget(block, cols[1]);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(status_line(&r.tree, "Tree", c));
    match r.tree.data() {
        None if r.focus().is_none() => {
            lines.push(Line::from(Span::styled(
                "Search for a user, or press Enter on a row in Users.",
                Style::default().fg(c.text_dim),
            )));
        }
        None => {}
        Some(view) => {
            if let Some(root) = &view.root {
                lines.push(Line::from(vec![
                    Span::styled(root.display_name().to_string(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", root.contact_line()), Style::default().fg(c.text_dim)),
                ]));
            }
            match &view.tree {
                Some(tree) if !tree.is_empty() => {
                    lines.push(Line::from(format!("Total referrals: {}", tree.total_referrals())));
                    for (i, level) in tree.levels.iter().enumerate() {
                        let selected = tree_focused && i == r.selected_level();
                        let mut head = vec![Span::styled(
                            format!("Level {} · {} users", level.level, level.descendants.len()),
                            Style::default().fg(c.focus_border).add_modifier(Modifier::BOLD),
                        )];
                        if LevelExpansion::has_toggle(level) {
                            head.push(Span::styled(
                                format!("  [{}]", r.expansion.toggle_label(level)),
                                Style::default().fg(c.chip),
                            ));
                        }
                        let mut head = Line::from(head);
                        if selected {
                            head = head.style(Style::default().bg(c.selection_bg).fg(c.selection_fg));
                        }
                        lines.push(head);
                        for u in r.expansion.visible(level) {
                            let mut spans = vec![Span::raw(format!("  • {}", u.display_name()))];
                            if let Some(label) = u.activity.label() {
                                spans.push(Span::styled(format!(" [{label}]"), Style::default().fg(c.activity(u.activity))));
                            }
                            if let Some(extra) = u.secondary_line() {
                                spans.push(Span::styled(format!("  {extra}"), Style::default().fg(c.text_dim)));
                            }
                            lines.push(Line::from(spans));
                        }
                    }
                }
                _ => lines.push(Line::from(Span::styled("No referrals yet.", Style::default().fg(c.text_dim)))),
            }
        }
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn non_paid_pane(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let r = app.referrals();
    let title = format!(" Non-paid referrals · page {} of {} ", r.non_paid_page(), r.non_paid_total_pages());
    let block = bordered(&title, c.focus_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(status_line(&r.non_paid, "Non-paid", c)), rows[0]);

    let items: Vec<ListItem> = r
        .non_paid
        .data()
        .map(|p| p.items.iter().map(|u| user_item(u, c)).collect())
        .unwrap_or_default();
    f.render_widget(List::new(items), rows[1]);
}

fn withdrawals_tab(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let w = app.withdrawals();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(9),
        ])
        .split(area);

    // Filter chips
    let mut chips = Vec::new();
    for filter in WithdrawalFilter::ALL {
        let style = if filter == w.filter() {
            Style::default().bg(c.selection_bg).fg(c.selection_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(c.text_dim)
        };
        chips.push(Span::styled(format!(" {} ", filter.label()), style));
        chips.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(chips)), rows[0]);

    input_box(f, rows[1], app, Field::WithdrawalUser, c);

    let mut line = status_line(&w.list, "Requests", c);
    if let Some(err) = w.action_error() {
        line.spans.push(Span::styled(format!("  {err}"), Style::default().fg(c.toast_error)));
    } else if let Some(ok) = w.action_success() {
        line.spans.push(Span::styled(format!("  {ok}"), Style::default().fg(c.toast_success)));
    }
    f.render_widget(Paragraph::new(line), rows[2]);

    let items: Vec<ListItem> = w
        .items()
        .iter()
        .map(|item| {
            let busy = item.id.is_some() && item.id.as_deref() == w.busy_id();
            let mut spans = vec![
                Span::styled(format!("{:<24}", item.requester.display_name()), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(" {:>14}", item.amount_text())),
                Span::raw("  "),
                Span::styled(format!("[{}]", item.status.label()), Style::default().fg(c.tone(item.status.tone()))),
            ];
            if busy {
                spans.push(Span::styled("  updating...", Style::default().fg(c.text_dim)));
            }
            ListItem::new(vec![
                Line::from(spans),
                Line::from(Span::styled(format!("  {}", item.requester.contact()), Style::default().fg(c.text_dim))),
            ])
        })
        .collect();
    let mut st = ListState::default();
    if !items.is_empty() {
        st.select(Some(w.selected()));
    }
    let list = List::new(items)
        .highlight_style(Style::default().bg(c.selection_bg).fg(c.selection_fg))
        .block(bordered(" Withdrawal requests ", c.focus_border));
    f.render_stateful_widget(list, rows[3], &mut st);

    withdrawal_details(f, rows[4], app, c);
}

fn withdrawal_details(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let w = app.withdrawals();
    let block = bordered(" Details ", c.unfocused_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(item) = w.selected_item() else {
        return;
    };
    let dim = Style::default().fg(c.text_dim);
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "--".to_string());
    let copied = |field: CopyField| {
        match item.id.as_deref() {
            Some(id) if app.is_copied(id, field) => " (copied)",
            _ => "",
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{}: ", item.method_text()), dim),
            Span::raw(item.amount_text()),
            Span::styled("   Requested: ", dim),
            Span::raw(item.created_at.as_ref().map(format_date_time).unwrap_or_else(|| "--".to_string())),
        ]),
        Line::from(vec![
            Span::styled("Bank: ", dim),
            Span::raw(or_dash(&item.bank.bank_name)),
            Span::styled("   Holder: ", dim),
            Span::raw(or_dash(&item.bank.account_name)),
        ]),
        Line::from(vec![
            Span::styled("Account: ", dim),
            Span::raw(format!("{}{}", or_dash(&item.bank.account_number), copied(CopyField::AccountNumber))),
            Span::styled("   IFSC: ", dim),
            Span::raw(format!("{}{}", or_dash(&item.bank.ifsc), copied(CopyField::Ifsc))),
        ]),
        Line::from(vec![
            Span::styled("UPI: ", dim),
            Span::raw(format!("{}{}", or_dash(&item.upi.upi_id), copied(CopyField::Upi))),
            Span::styled("   Name: ", dim),
            Span::raw(or_dash(&item.upi.upi_name)),
        ]),
    ];
    if item.payment_ref.is_some() || item.admin_note.is_some() {
        lines.push(Line::from(vec![
            Span::styled("Payment ref: ", dim),
            Span::raw(or_dash(&item.payment_ref)),
            Span::styled("   Note: ", dim),
            Span::raw(or_dash(&item.admin_note)),
        ]));
    }
    if w.actions_visible() && !item.status.is_final() {
        let draft = item.id.as_deref().and_then(|id| w.note(id)).cloned().unwrap_or_default();
        let editing = |nf| app.editing() == Some(Field::Note(nf));
        let draft_style = |on: bool| if on { Style::default().fg(c.focus_border) } else { Style::default() };
        lines.push(Line::from(vec![
            Span::styled("New ref: ", dim),
            Span::styled(draft.payment_ref.clone(), draft_style(editing(NoteField::PaymentRef))),
            Span::styled("   New note: ", dim),
            Span::styled(draft.admin_note.clone(), draft_style(editing(NoteField::AdminNote))),
        ]));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn messages_tab(f: &mut Frame, area: Rect, app: &App, c: &ColorScheme) {
    let m = app.messages();
    let fields = m.fields();
    let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default().direction(Direction::Vertical).constraints(constraints).split(area);

    let mut cats = vec![Span::styled("Category: ", Style::default().fg(c.text_dim))];
    for cat in MessageCategory::ALL {
        let style = if cat == m.category() {
            Style::default().bg(c.selection_bg).fg(c.selection_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(c.text_dim)
        };
        cats.push(Span::styled(format!(" {} ", cat.label()), style));
        cats.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(cats)), rows[0]);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Type: ", Style::default().fg(c.text_dim)),
            Span::styled(m.kind().label(), Style::default().add_modifier(Modifier::BOLD)),
        ])),
        rows[1],
    );

    for (i, field) in fields.iter().enumerate() {
        let area = rows[2 + i];
        let selected = app.message_field() == *field && app.editing().is_none();
        input_box(f, area, app, Field::Message(*field), c);
        if selected {
            f.render_widget(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(c.focus_border)),
                area,
            );
        }
    }

    let status = if m.is_sending() {
        Line::from(Span::styled("Sending...", Style::default().fg(c.text_dim)))
    } else if let Some(err) = m.error() {
        Line::from(Span::styled(err, Style::default().fg(c.toast_error)))
    } else if let Some(ok) = m.success() {
        Line::from(Span::styled(ok, Style::default().fg(c.toast_success)))
    } else {
        Line::default()
    };
    f.render_widget(Paragraph::new(status), rows[2 + fields.len()]);
}

fn coming_soon(f: &mut Frame, area: Rect, tab: Tab, c: &ColorScheme) {
    let w = Paragraph::new(format!("{} is coming soon.", tab.label()))
        .style(Style::default().fg(c.text_dim))
        .block(bordered("", c.unfocused_border));
    f.render_widget(w, area);
}

// ===============================
// Overlays / helpers
// ===============================
fn draw_toast_modal(f: &mut Frame, app: &App, c: &ColorScheme) {
    let Some((message, kind)) = app.toast_message() else {
        return;
    };
    let (color, mark) = match kind {
        ToastKind::Success => (c.toast_success, "✓"),
        ToastKind::Error => (c.toast_error, "✗"),
    };

    // Small box above the footer
    let area = f.area();
    let width = ((area.width * 5) / 10).max(20).min(area.width);
    let height = 3;
    let overlay = Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: area.height.saturating_sub(height + 3),
        width,
        height: height.min(area.height),
    };

    f.render_widget(Clear, overlay);
    let text = Paragraph::new(format!("{mark} {message}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(text, overlay);
}

fn status_line<'a, T>(state: &LoadState<T>, what: &str, c: &ColorScheme) -> Line<'a> {
    match state.phase() {
        Phase::Idle => Line::from(Span::styled(format!("{what}: idle"), Style::default().fg(c.text_dim))),
        Phase::Loading => Line::from(Span::styled(format!("{what}: loading..."), Style::default().fg(c.text_dim))),
        Phase::Ready => Line::from(Span::styled(format!("{what}: up to date"), Style::default().fg(c.text_dim))),
        Phase::Error => Line::from(Span::styled(
            state.error().unwrap_or_default().to_string(),
            Style::default().fg(c.toast_error),
        )),
    }
}

fn pane_color(focused: bool, c: &ColorScheme) -> ratatui::style::Color {
    if focused {
        c.focus_border
    } else {
        c.unfocused_border
    }
}

fn bordered(title: &str, color: ratatui::style::Color) -> Block<'static> {
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}
