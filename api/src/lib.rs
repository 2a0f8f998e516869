pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types, independent of the backend's JSON envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub alias: String,
    pub email: String,
    pub score: i64,
    pub team_ids: Vec<i64>,
    pub tournament_ids: Vec<i64>,
    /// Backend auth token; only present on session endpoints.
    pub auth: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl User {
    /// Alias when the user picked one, username otherwise.
    pub fn display_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.username
        } else {
            &self.alias
        }
    }
}

/// Envelope of `GET j/users/show/:id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserShow {
    pub user: User,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub admin_ids: Vec<i64>,
    pub private: bool,
    pub tournament_ids: Vec<i64>,
    pub accuracy: f64,
}

/// Envelope of `GET j/teams/show/:id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamShow {
    pub team: Team,
    pub joined: bool,
    pub request_sent: bool,
    pub players: Vec<User>,
    pub tournaments: Vec<TournamentSummary>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub admin_ids: Vec<i64>,
}

/// Envelope of `GET j/tournaments/show/:id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentShow {
    pub tournament: Tournament,
    pub joined: bool,
    pub participants: Vec<User>,
    pub teams: Vec<TeamSummary>,
    pub image_url: Option<String>,
}

impl TournamentShow {
    /// Whether `team_id` is one of the teams taking part in this tournament.
    pub fn has_team(&self, team_id: i64) -> bool {
        self.teams.iter().any(|t| t.id == team_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentSummary {
    pub id: i64,
    pub name: String,
    pub participants_count: usize,
    pub teams_count: usize,
    pub progress: f64,
}

/// One row of a ranking list (users or teams).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranked {
    pub id: i64,
    pub name: String,
    pub score: i64,
}

/// A team administered by the current user that may take part in a tournament.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub team: TeamSummary,
    pub joined: bool,
}

/// Result of a sign-in endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignedInUser {
    pub user: User,
    /// Google accounts hand back the access token alongside the user.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankBy {
    #[default]
    Users,
    Teams,
}

impl RankBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankBy::Users => "users",
            RankBy::Teams => "teams",
        }
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Someone or something an activity refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityEntity {
    pub id: i64,
    pub kind: String,
    pub display_name: String,
}

/// One entry of the activity feed, e.g. "remy joined Les Bleus".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub kind: String,
    pub verb: String,
    pub actor: ActivityEntity,
    pub object: Option<ActivityEntity>,
    pub target: Option<ActivityEntity>,
    pub published: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn sentence(&self) -> String {
        let mut sentence = format!("{} {}", self.actor.display_name, self.verb);
        for entity in [&self.object, &self.target].into_iter().flatten() {
            if !entity.display_name.is_empty() {
                sentence.push(' ');
                sentence.push_str(&entity.display_name);
            }
        }
        sentence
    }
}

/// One page of `j/activities`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPage {
    pub activities: Vec<Activity>,
    pub current_page: u32,
    pub last_page: u32,
}

impl ActivityPage {
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// Something a subject can join or leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collective {
    /// The current user joining a team.
    Team(i64),
    /// The current user joining a tournament.
    Tournament(i64),
    /// A team joining a tournament on behalf of its members.
    TournamentAsTeam { tournament_id: i64, team_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipAction {
    Join,
    Leave,
    /// Private teams cannot be joined directly; the admins get a request instead.
    RequestInvite,
}

impl MembershipAction {
    pub fn label(self) -> &'static str {
        match self {
            MembershipAction::Join => "Join",
            MembershipAction::Leave => "Leave",
            MembershipAction::RequestInvite => "Request invitation",
        }
    }
}

/// A join or leave call against one collective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MembershipOp {
    pub collective: Collective,
    pub action: MembershipAction,
}

impl MembershipOp {
    /// Backend path, relative to the API base URL. Only teams take invitation
    /// requests, so `RequestInvite` on a tournament has no endpoint.
    pub fn path(&self) -> Option<String> {
        use Collective::*;
        use MembershipAction::*;
        let path = match (self.collective, self.action) {
            (Team(id), Join) => format!("j/teams/join/{id}"),
            (Team(id), Leave) => format!("j/teams/leave/{id}"),
            (Team(id), RequestInvite) => format!("j/teams/requestinvite/{id}"),
            (Tournament(id), Join) => format!("j/tournaments/join/{id}"),
            (Tournament(id), Leave) => format!("j/tournaments/leave/{id}"),
            (TournamentAsTeam { tournament_id, team_id }, Join) => {
                format!("j/tournaments/joinasteam/{tournament_id}/{team_id}")
            }
            (TournamentAsTeam { tournament_id, team_id }, Leave) => {
                format!("j/tournaments/leaveasteam/{tournament_id}/{team_id}")
            }
            (Tournament(_) | TournamentAsTeam { .. }, RequestInvite) => return None,
        };
        Some(path)
    }
}

/// Envelope returned by every join/leave endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipReply {
    pub message_info: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_alias() {
        let mut user = User { username: "jdoe".into(), ..Default::default() };
        assert_eq!(user.display_name(), "jdoe");
        user.alias = "Johnny".into();
        assert_eq!(user.display_name(), "Johnny");
    }

    #[test]
    fn membership_paths_follow_collective_kind() {
        let op = MembershipOp { collective: Collective::Team(3), action: MembershipAction::Leave };
        assert_eq!(op.path().as_deref(), Some("j/teams/leave/3"));

        let op = MembershipOp {
            collective: Collective::TournamentAsTeam { tournament_id: 42, team_id: 7 },
            action: MembershipAction::Join,
        };
        assert_eq!(op.path().as_deref(), Some("j/tournaments/joinasteam/42/7"));
    }

    #[test]
    fn only_teams_take_invitation_requests() {
        let op = MembershipOp {
            collective: Collective::Team(3),
            action: MembershipAction::RequestInvite,
        };
        assert_eq!(op.path().as_deref(), Some("j/teams/requestinvite/3"));

        let op = MembershipOp {
            collective: Collective::Tournament(42),
            action: MembershipAction::RequestInvite,
        };
        assert_eq!(op.path(), None);
    }

    #[test]
    fn activity_sentence_skips_empty_entities() {
        let activity = Activity {
            verb: "joined".into(),
            actor: ActivityEntity { display_name: "remy".into(), ..Default::default() },
            object: Some(ActivityEntity { display_name: "Les Bleus".into(), ..Default::default() }),
            target: Some(ActivityEntity::default()),
            ..Default::default()
        };
        assert_eq!(activity.sentence(), "remy joined Les Bleus");

        let page = ActivityPage { current_page: 1, last_page: 2, ..Default::default() };
        assert!(page.has_more());
    }

    #[test]
    fn tournament_team_lookup() {
        let show = TournamentShow {
            teams: vec![TeamSummary { id: 7, name: "Sevens".into() }],
            ..Default::default()
        };
        assert!(show.has_team(7));
        assert!(!show.has_team(8));
    }
}
