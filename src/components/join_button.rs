use crate::state::membership::MembershipToggle;
use gonawin_api::MembershipAction;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

/// One-line join/leave button. Renders nothing until the membership is known.
pub struct JoinButton<'a> {
    pub toggle: &'a MembershipToggle,
    /// Prefix shown before the button, e.g. a team name.
    pub caption: Option<&'a str>,
    pub focused: bool,
}

impl<'a> JoinButton<'a> {
    pub fn new(toggle: &'a MembershipToggle) -> Self {
        Self { toggle, caption: None, focused: false }
    }

    pub fn caption(mut self, caption: &'a str) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn text(&self) -> Option<String> {
        let label = self.toggle.label()?;
        let button = if self.toggle.is_submitting() {
            format!("[ {label}… ]")
        } else {
            format!("[ {label} ]")
        };
        Some(match self.caption {
            Some(caption) => format!("{caption}  {button}"),
            None => button,
        })
    }

    fn style(&self) -> Style {
        let color = match self.toggle.action() {
            Some(MembershipAction::Join) => Color::Green,
            Some(MembershipAction::Leave) => Color::Red,
            Some(MembershipAction::RequestInvite) => Color::Yellow,
            None => Color::DarkGray,
        };
        let style = Style::default().fg(color);
        if self.focused { style.add_modifier(Modifier::REVERSED) } else { style }
    }
}

impl Widget for JoinButton<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let Some(text) = self.text() else {
            return;
        };
        let marker = if self.focused { "> " } else { "  " };
        buf.set_stringn(
            area.x,
            area.y,
            format!("{marker}{text}"),
            area.width as usize,
            self.style(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonawin_api::{Collective, Team, TeamShow};
    use crate::state::membership::Target;

    fn rendered(button: JoinButton) -> String {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        button.render(area, &mut buf);
        buf.content.iter().map(|c| c.symbol()).collect::<String>().trim_end().to_string()
    }

    fn resolved(joined: bool) -> MembershipToggle {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&TeamShow {
            team: Team { id: 3, ..Default::default() },
            joined,
            ..Default::default()
        }));
        toggle
    }

    #[test]
    fn unresolved_renders_nothing() {
        let toggle = MembershipToggle::new(Collective::Team(3));
        assert_eq!(rendered(JoinButton::new(&toggle)), "");
    }

    #[test]
    fn label_follows_membership() {
        assert_eq!(rendered(JoinButton::new(&resolved(true))), "  [ Leave ]");
        assert_eq!(rendered(JoinButton::new(&resolved(false)).focused(true)), "> [ Join ]");
    }

    #[test]
    fn sent_invitation_request_is_greyed_out() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&TeamShow {
            team: Team { id: 3, private: true, ..Default::default() },
            request_sent: true,
            ..Default::default()
        }));
        let button = JoinButton::new(&toggle);
        assert_eq!(button.style().fg, Some(Color::DarkGray));
        assert_eq!(rendered(button), "  [ Invitation requested ]");
    }

    #[test]
    fn caption_and_pending_marker() {
        let mut toggle = resolved(false);
        toggle.click();
        assert_eq!(rendered(JoinButton::new(&toggle).caption("Sevens")), "  Sevens  [ Join… ]");
    }
}
