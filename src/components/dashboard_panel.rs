use crate::state::dashboard::{DashboardContext, DashboardView};
use gonawin_api::{RankBy, Ranked};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget, Wrap};

const PLACEHOLDER: &str = "…";

/// Summary of the current context: who is signed in and the counters and
/// rankings that matter for the entity on screen.
pub struct DashboardPanel<'a> {
    pub view: &'a DashboardView,
    pub rank_by: RankBy,
}

impl Widget for DashboardPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines()).wrap(Wrap { trim: true }).render(area, buf);
    }
}

impl DashboardPanel<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let view = self.view;
        let Some(context) = view.context else {
            return vec![Line::styled("Not signed in", Style::default().fg(Color::DarkGray))];
        };

        let mut lines = vec![
            Line::from(Span::styled(
                view.name.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::styled(context.label().to_string(), Style::default().fg(Color::DarkGray)),
            Line::default(),
        ];

        match context {
            DashboardContext::Tournament(_) => {
                lines.push(stat("Participants", view.n_participants));
                lines.push(stat("Teams", view.n_teams));
                lines.push(Line::default());
                let (title, ranking) = match self.rank_by {
                    RankBy::Users => ("Top players", &view.rank_users),
                    RankBy::Teams => ("Top teams", &view.rank_teams),
                };
                lines.push(heading(title));
                lines.extend(ranking_lines(ranking.as_deref()));
            }
            DashboardContext::Team(_) => {
                lines.push(stat("Members", view.n_members));
                lines.push(stat("Tournaments", view.n_tournaments));
                lines.push(Line::from(format!(
                    "Accuracy: {}",
                    view.accuracy.map_or(PLACEHOLDER.to_string(), |a| format!("{a:.2}"))
                )));
                lines.push(Line::default());
                lines.push(heading("Top members"));
                lines.extend(ranking_lines(view.members.as_deref()));
            }
            DashboardContext::User
            | DashboardContext::Default
            | DashboardContext::TeamsIndex
            | DashboardContext::TournamentsIndex => {
                lines.push(stat("Score", view.score));
                lines.push(stat("Teams", view.n_teams));
                lines.push(stat("Tournaments", view.n_tournaments));
            }
        }

        if let Some(user) = view.user.as_deref()
            && matches!(context, DashboardContext::Tournament(_) | DashboardContext::Team(_))
        {
            lines.push(Line::default());
            lines.push(Line::styled(format!("Signed in as {user}"), Style::default().fg(Color::Gray)));
        }
        lines
    }
}

fn stat<T: ToString>(label: &str, value: Option<T>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::raw(value.map_or(PLACEHOLDER.to_string(), |v| v.to_string())),
    ])
}

fn heading(title: &str) -> Line<'static> {
    Line::styled(title.to_string(), Style::default().add_modifier(Modifier::UNDERLINED))
}

fn ranking_lines(ranking: Option<&[Ranked]>) -> Vec<Line<'static>> {
    match ranking {
        None => vec![Line::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))],
        Some([]) => vec![Line::styled("nobody yet", Style::default().fg(Color::DarkGray))],
        Some(rows) => rows
            .iter()
            .enumerate()
            .map(|(i, row)| Line::from(format!("{:>2}. {:<18} {:>5}", i + 1, row.name, row.score)))
            .collect(),
    }
}
