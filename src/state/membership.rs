use gonawin_api::{
    Collective, MembershipAction, MembershipOp, MembershipReply, TeamShow, TournamentShow,
};
use log::{debug, warn};

/// Last membership state confirmed by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Membership {
    #[default]
    Unknown,
    Joined,
    NotJoined,
    /// Outside a private team, which only admits by invitation.
    Private,
    /// An invitation request to a private team is waiting for its admins.
    Requested,
}

impl Membership {
    fn from_joined(joined: bool) -> Self {
        if joined { Membership::Joined } else { Membership::NotJoined }
    }

    fn from_team(show: &TeamShow) -> Self {
        match (show.joined, show.team.private, show.request_sent) {
            (true, _, _) => Membership::Joined,
            (false, false, _) => Membership::NotJoined,
            (false, true, false) => Membership::Private,
            (false, true, true) => Membership::Requested,
        }
    }
}

/// A freshly fetched resource a toggle can resolve against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Team(&'a TeamShow),
    Tournament(&'a TournamentShow),
}

/// Join/leave button state for one collective.
///
/// The button label is always the negation of the membership state, and the
/// state only moves after the backend has confirmed an operation.
#[derive(Debug, Clone)]
pub struct MembershipToggle {
    pub collective: Collective,
    state: Membership,
    /// Whether the collective is a private team. Leaving one lands in
    /// [`Membership::Private`].
    private: bool,
    submitting: bool,
    /// `MessageInfo` of the last successful operation.
    pub info: Option<String>,
    pub error: Option<String>,
}

impl MembershipToggle {
    pub fn new(collective: Collective) -> Self {
        Self {
            collective,
            state: Membership::Unknown,
            private: false,
            submitting: false,
            info: None,
            error: None,
        }
    }

    pub fn state(&self) -> Membership {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn resolve(&mut self, target: Target<'_>) {
        self.state = match (self.collective, target) {
            (Collective::Team(id), Target::Team(show)) if show.team.id == id => {
                self.private = show.team.private;
                Membership::from_team(show)
            }
            (Collective::Tournament(id), Target::Tournament(show)) if show.tournament.id == id => {
                Membership::from_joined(show.joined)
            }
            (Collective::TournamentAsTeam { tournament_id, team_id }, Target::Tournament(show))
                if show.tournament.id == tournament_id =>
            {
                Membership::from_joined(show.has_team(team_id))
            }
            _ => {
                debug!("{:?} cannot resolve against {target:?}", self.collective);
                return;
            }
        };
    }

    /// Button text. A sent invitation request stays visible but has no action.
    pub fn label(&self) -> Option<&'static str> {
        match self.state {
            Membership::Requested => Some("Invitation requested"),
            _ => self.action().map(MembershipAction::label),
        }
    }

    pub fn action(&self) -> Option<MembershipAction> {
        match self.state {
            Membership::Unknown | Membership::Requested => None,
            Membership::Joined => Some(MembershipAction::Leave),
            Membership::NotJoined => Some(MembershipAction::Join),
            Membership::Private => Some(MembershipAction::RequestInvite),
        }
    }

    /// The operation to issue for a click, or `None` while a previous one is
    /// still outstanding or the state is not known yet.
    pub fn click(&mut self) -> Option<MembershipOp> {
        if self.submitting {
            return None;
        }
        let action = self.action()?;
        self.submitting = true;
        self.error = None;
        Some(MembershipOp { collective: self.collective, action })
    }

    pub fn succeeded(&mut self, op: &MembershipOp, reply: MembershipReply) {
        if op.collective != self.collective {
            warn!("membership reply for {:?} routed to {:?}", op.collective, self.collective);
            return;
        }
        self.submitting = false;
        self.state = match op.action {
            MembershipAction::Join => Membership::Joined,
            MembershipAction::Leave if self.private => Membership::Private,
            MembershipAction::Leave => Membership::NotJoined,
            MembershipAction::RequestInvite => Membership::Requested,
        };
        self.info = reply.message_info;
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonawin_api::{TeamSummary, Tournament, Team};

    fn team_show(id: i64, joined: bool) -> TeamShow {
        TeamShow { team: Team { id, ..Default::default() }, joined, ..Default::default() }
    }

    fn tournament_with_teams(id: i64, team_ids: &[i64]) -> TournamentShow {
        TournamentShow {
            tournament: Tournament { id, ..Default::default() },
            teams: team_ids
                .iter()
                .map(|&id| TeamSummary { id, name: format!("team {id}") })
                .collect(),
            ..Default::default()
        }
    }

    fn reply(text: &str) -> MembershipReply {
        MembershipReply { message_info: Some(text.into()) }
    }

    #[test]
    fn nothing_to_render_until_resolved() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        assert_eq!(toggle.label(), None);
        assert_eq!(toggle.click(), None);
        assert!(!toggle.is_submitting());
    }

    #[test]
    fn joined_member_leaves_once() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&team_show(3, true)));
        assert_eq!(toggle.label(), Some("Leave"));

        let op = toggle.click().unwrap();
        assert_eq!(op.action, MembershipAction::Leave);
        assert_eq!(op.path().as_deref(), Some("j/teams/leave/3"));
        assert_eq!(toggle.click(), None);

        toggle.succeeded(&op, reply("You left team."));
        assert!(toggle.click().is_some());
    }

    #[test]
    fn outsider_joins_once() {
        let mut toggle = MembershipToggle::new(Collective::Tournament(42));
        toggle.resolve(Target::Tournament(&TournamentShow {
            tournament: Tournament { id: 42, ..Default::default() },
            joined: false,
            ..Default::default()
        }));
        assert_eq!(toggle.label(), Some("Join"));

        let op = toggle.click().unwrap();
        assert_eq!(op.path().as_deref(), Some("j/tournaments/join/42"));
        assert_eq!(toggle.click(), None);
        assert_eq!(toggle.click(), None);
    }

    #[test]
    fn success_flips_without_refetch() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&team_show(3, false)));

        let join = toggle.click().unwrap();
        toggle.succeeded(&join, reply("You joined team Les Bleus."));
        assert_eq!(toggle.label(), Some("Leave"));
        assert_eq!(toggle.state(), Membership::Joined);
        assert_eq!(toggle.info.as_deref(), Some("You joined team Les Bleus."));

        let leave = toggle.click().unwrap();
        assert_eq!(leave.action, MembershipAction::Leave);
        toggle.succeeded(&leave, MembershipReply::default());
        assert_eq!(toggle.label(), Some("Join"));
        assert_eq!(toggle.info, None);
    }

    #[test]
    fn failure_keeps_state_and_shows_error() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&team_show(3, true)));

        toggle.click().unwrap();
        toggle.failed("Team administrator cannot leave the team");
        assert_eq!(toggle.label(), Some("Leave"));
        assert_eq!(toggle.action(), Some(MembershipAction::Leave));
        assert_eq!(toggle.error.as_deref(), Some("Team administrator cannot leave the team"));
        assert!(!toggle.is_submitting());

        toggle.click().unwrap();
        assert_eq!(toggle.error, None);
    }

    #[test]
    fn team_toggles_follow_tournament_team_list() {
        let show = tournament_with_teams(42, &[7, 9]);
        let mut seven =
            MembershipToggle::new(Collective::TournamentAsTeam { tournament_id: 42, team_id: 7 });
        let mut eight =
            MembershipToggle::new(Collective::TournamentAsTeam { tournament_id: 42, team_id: 8 });
        seven.resolve(Target::Tournament(&show));
        eight.resolve(Target::Tournament(&show));

        assert_eq!(seven.label(), Some("Leave"));
        assert_eq!(eight.label(), Some("Join"));
        assert_eq!(
            seven.click().unwrap().path().as_deref(),
            Some("j/tournaments/leaveasteam/42/7")
        );
        assert_eq!(
            eight.click().unwrap().path().as_deref(),
            Some("j/tournaments/joinasteam/42/8")
        );
    }

    fn private_team(id: i64, request_sent: bool) -> TeamShow {
        TeamShow {
            team: Team { id, private: true, ..Default::default() },
            request_sent,
            ..Default::default()
        }
    }

    #[test]
    fn outsider_of_private_team_requests_an_invitation() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&private_team(3, false)));
        assert_eq!(toggle.state(), Membership::Private);
        assert_eq!(toggle.label(), Some("Request invitation"));

        let op = toggle.click().unwrap();
        assert_eq!(op.action, MembershipAction::RequestInvite);
        assert_eq!(op.path().as_deref(), Some("j/teams/requestinvite/3"));

        toggle.succeeded(&op, reply("team request was created"));
        assert_eq!(toggle.state(), Membership::Requested);
        assert_eq!(toggle.label(), Some("Invitation requested"));
        assert_eq!(toggle.action(), None);
        assert_eq!(toggle.click(), None);
        assert_eq!(toggle.info.as_deref(), Some("team request was created"));
    }

    #[test]
    fn sent_request_is_greyed_out_after_reload() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&private_team(3, true)));
        assert_eq!(toggle.label(), Some("Invitation requested"));
        assert_eq!(toggle.click(), None);
        assert!(!toggle.is_submitting());
    }

    #[test]
    fn leaving_a_private_team_offers_a_request() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        let mut show = private_team(3, false);
        show.joined = true;
        toggle.resolve(Target::Team(&show));
        assert_eq!(toggle.label(), Some("Leave"));

        let leave = toggle.click().unwrap();
        toggle.succeeded(&leave, MembershipReply::default());
        assert_eq!(toggle.state(), Membership::Private);
        assert_eq!(toggle.action(), Some(MembershipAction::RequestInvite));
    }

    #[test]
    fn mismatched_target_is_ignored() {
        let mut toggle = MembershipToggle::new(Collective::Team(3));
        toggle.resolve(Target::Team(&team_show(4, true)));
        assert_eq!(toggle.state(), Membership::Unknown);
        toggle.resolve(Target::Tournament(&tournament_with_teams(3, &[])));
        assert_eq!(toggle.state(), Membership::Unknown);
    }
}
