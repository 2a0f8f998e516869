use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::components::dashboard_panel::DashboardPanel;
use crate::components::join_button::JoinButton;
use crate::state::app_state::{ActivitiesPage, IndexPage, Page, TeamPage, TournamentPage};
use crate::state::membership::MembershipToggle;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use log::error;

const HELP: &[(&str, &str)] = &[
    ("g", "home"),
    ("t / T", "teams / tournaments"),
    ("a", "activities"),
    ("m", "more activities"),
    ("j k", "move selection"),
    ("Enter", "open / press button"),
    ("J", "join, leave or request"),
    ("Tab", "next button"),
    ("r", "switch ranking"),
    ("R", "refresh"),
    ("/", "go to a path"),
    ("Backspace", "back"),
    ("f", "full screen"),
    ("\"", "logs"),
    ("L", "sign out"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_top_bar(f, layout.top_bar, app);
            draw_dashboard(f, layout.dashboard, app);
        }
        draw_page(f, layout.page, app);
        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }
        draw_status(f, layout.status, app);

        if app.state.confirm_leave.is_some() {
            draw_confirm_leave(f, f.area());
        }
        if app.state.show_help {
            draw_help(f, f.area());
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_top_bar(f: &mut Frame, top_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let location = match app.state.location_input.as_deref() {
        Some(input) => Line::from(vec![
            Span::styled(" go to: ", Style::default().fg(Color::Yellow)),
            Span::raw(input.to_string()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ]),
        None => Line::from(vec![
            Span::styled(" gonawin ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                app.state.navigator.current().url.clone(),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(format!("  {}", app.state.page.title()), Style::default().fg(Color::DarkGray)),
        ]),
    };
    let bar = Paragraph::new(location)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(bar, top_bar[0]);

    let signed_in = match app.session.current_user() {
        Some(user) => format!("{}  Help: ? ", user.display_name()),
        None => "Help: ? ".to_string(),
    };
    let help = Paragraph::new(signed_in)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, top_bar[1]);
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Dashboard ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        DashboardPanel { view: &app.state.dashboard.view, rank_by: app.state.dashboard.rank_by },
        inner,
    );
}

fn draw_page(f: &mut Frame, area: Rect, app: &App) {
    match &app.state.page {
        Page::Home => draw_placeholder(
            f,
            area,
            "Welcome back.\n\nt: your teams   T: your tournaments   /: go to a path",
        ),
        Page::Welcome | Page::SignIn => draw_placeholder(
            f,
            area,
            "gonawin: social predictions for sports tournaments.\n\n\
             Sign in from a shell, then start the client again:\n\
             gonawin signin google | twitter | facebook",
        ),
        Page::About => draw_placeholder(
            f,
            area,
            "gonawin lets you and your friends predict match results\n\
             and compete inside teams and tournaments.",
        ),
        Page::GettingStarted => draw_placeholder(
            f,
            area,
            "1. Join or create a team.\n2. Join a tournament, alone or with your team.\n3. Predict.",
        ),
        Page::NotFound => draw_placeholder(f, area, "404: nothing lives at this address."),
        Page::Passive => draw_placeholder(f, area, "This page is only available in the web client."),
        Page::Teams(index) => draw_teams_index(f, area, app, index),
        Page::Tournaments(index) => draw_tournaments_index(f, area, app, index),
        Page::Team(page) => draw_team(f, area, page),
        Page::Tournament(page) => draw_tournament(f, area, page),
        Page::Activities(page) => draw_activities(f, area, page),
    }
}

fn draw_activities(f: &mut Frame, area: Rect, page: &ActivitiesPage) {
    let title = match (page.page, page.more) {
        (0, _) => " Activities ".to_string(),
        (n, true) => format!(" Activities (page {n}, m: more) "),
        (n, false) => format!(" Activities (page {n}) "),
    };
    let block = default_border(Color::White).title(title);

    if page.activities.is_empty() {
        let text = match (page.error.as_deref(), page.loading) {
            (Some(error), _) => error.to_string(),
            (None, true) => "Loading...".to_string(),
            (None, false) => "No activity yet".to_string(),
        };
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = page
        .activities
        .iter()
        .map(|activity| {
            let when = activity
                .published
                .map(|at| at.with_timezone(&chrono::Local).format("%d %b %H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{when:<13}"), Style::default().fg(Color::DarkGray)),
                Span::raw(activity.sentence()),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(page.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_teams_index(f: &mut Frame, area: Rect, app: &App, index: &IndexPage) {
    let items: Option<Vec<ListItem>> = app.state.dashboard.view.teams.as_ref().map(|teams| {
        teams.iter().map(|team| ListItem::new(team.name.clone())).collect()
    });
    draw_index(f, area, " My teams ", items, index.selected);
}

fn draw_tournaments_index(f: &mut Frame, area: Rect, app: &App, index: &IndexPage) {
    let items: Option<Vec<ListItem>> =
        app.state.dashboard.view.tournaments.as_ref().map(|tournaments| {
            tournaments
                .iter()
                .map(|t| {
                    ListItem::new(format!(
                        "{:<28} {:>3} players {:>3} teams {:>4.0}%",
                        t.name,
                        t.participants_count,
                        t.teams_count,
                        t.progress * 100.0
                    ))
                })
                .collect()
        });
    draw_index(f, area, " My tournaments ", items, index.selected);
}

fn draw_index(f: &mut Frame, area: Rect, title: &str, items: Option<Vec<ListItem>>, selected: usize) {
    let block = default_border(Color::White).title(title.to_string());
    let Some(items) = items else {
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new("Loading...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };
    if items.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new("Nothing here yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_team(f: &mut Frame, area: Rect, page: &TeamPage) {
    let title = page
        .team
        .as_ref()
        .map_or_else(|| format!(" Team {} ", page.id), |show| format!(" {} ", show.team.name));
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [button_area, messages_area, body_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(2), Constraint::Fill(1)])
            .areas(inner);

    f.render_widget(JoinButton::new(&page.toggle).focused(true), button_area);
    draw_toggle_messages(f, messages_area, &page.toggle, page.error.as_deref());

    let Some(show) = page.team.as_ref() else {
        f.render_widget(Paragraph::new("Loading team...").style(Style::default().fg(Color::DarkGray)), body_area);
        return;
    };

    let mut lines = Vec::new();
    if !show.team.description.is_empty() {
        lines.push(Line::from(show.team.description.clone()));
        lines.push(Line::default());
    }
    lines.push(Line::from(format!(
        "{} team, accuracy {:.2}",
        if show.team.private { "Private" } else { "Public" },
        show.team.accuracy
    )));
    if show.request_sent {
        lines.push(Line::styled("Join request sent", Style::default().fg(Color::Yellow)));
    }
    lines.push(Line::default());
    lines.push(Line::styled(
        format!("Members ({})", show.players.len()),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ));
    lines.extend(
        show.players
            .iter()
            .map(|p| Line::from(format!("  {:<24} {:>5}", p.display_name(), p.score))),
    );
    lines.push(Line::default());
    lines.push(Line::styled(
        format!("Tournaments ({})", show.tournaments.len()),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ));
    lines.extend(show.tournaments.iter().map(|t| Line::from(format!("  {}", t.name))));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body_area);
}

fn draw_tournament(f: &mut Frame, area: Rect, page: &TournamentPage) {
    let title = page.tournament.as_ref().map_or_else(
        || format!(" Tournament {} ", page.id),
        |show| format!(" {} ", show.tournament.name),
    );
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let buttons = 1 + page.candidates.len() as u16;
    let [button_area, messages_area, body_area] = Layout::vertical([
        Constraint::Length(buttons + u16::from(!page.candidates.is_empty())),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let mut rows = button_area.rows();
    if let Some(row) = rows.next() {
        f.render_widget(
            JoinButton::new(&page.toggle).caption("Me").focused(page.selected == 0),
            row,
        );
    }
    if !page.candidates.is_empty() {
        if let Some(row) = rows.next() {
            f.render_widget(
                Paragraph::new("  As a team:").style(Style::default().fg(Color::DarkGray)),
                row,
            );
        }
        for (idx, (candidate, row)) in page.candidates.iter().zip(rows).enumerate() {
            f.render_widget(
                JoinButton::new(&candidate.toggle)
                    .caption(&candidate.candidate.team.name)
                    .focused(page.selected == idx + 1),
                row,
            );
        }
    }

    let focused = match page.selected.checked_sub(1).and_then(|i| page.candidates.get(i)) {
        Some(candidate) => &candidate.toggle,
        None => &page.toggle,
    };
    draw_toggle_messages(f, messages_area, focused, page.error.as_deref());

    let Some(show) = page.tournament.as_ref() else {
        f.render_widget(
            Paragraph::new("Loading tournament...").style(Style::default().fg(Color::DarkGray)),
            body_area,
        );
        return;
    };

    let mut lines = Vec::new();
    if !show.tournament.description.is_empty() {
        lines.push(Line::from(show.tournament.description.clone()));
        lines.push(Line::default());
    }
    if let Some(tab) = page.tab.as_deref() {
        lines.push(Line::styled(format!("[{tab}]"), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::styled(
        format!("Participants ({})", show.participants.len()),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ));
    lines.extend(show.participants.iter().map(|p| Line::from(format!("  {}", p.display_name()))));
    lines.push(Line::default());
    lines.push(Line::styled(
        format!("Teams ({})", show.teams.len()),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ));
    lines.extend(show.teams.iter().map(|t| Line::from(format!("  {}", t.name))));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body_area);
}

fn draw_toggle_messages(f: &mut Frame, area: Rect, toggle: &MembershipToggle, page_error: Option<&str>) {
    let mut lines = Vec::new();
    if let Some(info) = toggle.info.as_deref() {
        lines.push(Line::styled(info.to_string(), Style::default().fg(Color::Green)));
    }
    if let Some(error) = toggle.error.as_deref().or(page_error) {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let Some(status) = app.state.status.as_ref() else {
        return;
    };
    let color = if status.is_error { Color::Red } else { Color::Green };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", status.at), Style::default().fg(Color::DarkGray)),
        Span::styled(status.text.clone(), Style::default().fg(color)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_confirm_leave(f: &mut Frame, area: Rect) {
    let popup = centered(area, 36, 5);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Yellow).title(" Leave ");
    f.render_widget(
        Paragraph::new("Are you sure?\n\ny: leave   n: cancel")
            .alignment(Alignment::Center)
            .block(block),
        popup,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let popup = centered(area, 44, HELP.len() as u16 + 2);
    f.render_widget(Clear, popup);
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {key:<11}"), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(default_border(Color::White).title(" Help ")), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use crate::state::session::{Provider, SessionContext, SessionStore};
    use gonawin_api::User;
    use tui::backend::TestBackend;

    fn top_bar_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 3)).unwrap();
        terminal
            .draw(|f| draw_top_bar(f, [Rect::new(0, 0, 40, 3), Rect::new(40, 0, 40, 3)], app))
            .unwrap();
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn top_bar_names_the_signed_in_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let settings = AppSettings {
            api_url: "http://localhost:8080".into(),
            session_file: path.clone(),
            full_screen: false,
            log_level: None,
        };
        let mut session = SessionContext::init(SessionStore::new(&path));
        let app = App::new(settings.clone(), SessionContext::init(SessionStore::new(&path)));
        assert!(!top_bar_text(&app).contains("remy"));

        let user =
            User { id: 5, username: "remy".into(), auth: Some("auth".into()), ..Default::default() };
        session.sign_in(Provider::Google, "token".into(), user).unwrap();
        let app = App::new(settings, session);
        assert!(top_bar_text(&app).contains("remy  Help: ?"));
    }

    #[test]
    fn centered_popup_fits_inside() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(area, 50, 50), area);
    }
}
