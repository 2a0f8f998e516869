use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use gonawin_api::client::ApiError;
use gonawin_api::{
    ActivityPage, Candidate, MembershipOp, MembershipReply, RankBy, Ranked, TeamShow, TeamSummary,
    TournamentShow, TournamentSummary, UserShow,
};

/// Who asked for a fetch, tagged with the generation that was current at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Dashboard(u64),
    Page(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    CurrentUser { user_id: i64 },
    UserTeams { user_id: i64 },
    UserTournaments { user_id: i64 },
    Team { id: i64 },
    TeamRanking { id: i64 },
    Tournament { id: i64 },
    TournamentRanking { id: i64, rank_by: RankBy },
    Candidates { id: i64 },
    /// Pages start at 1.
    Activities { page: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkRequest {
    Fetch { origin: Origin, fetch: Fetch },
    /// Issued alone; the follow-up re-fetch waits for the reply.
    Membership { page: u64, op: MembershipOp },
    SignOut { delete_google_cookie: bool },
}

#[derive(Debug, Clone)]
pub enum Payload {
    CurrentUser(UserShow),
    UserTeams(Vec<TeamSummary>),
    UserTournaments(Vec<TournamentSummary>),
    Team(TeamShow),
    TeamRanking(Vec<Ranked>),
    Tournament(TournamentShow),
    TournamentRanking { rank_by: RankBy, ranked: Vec<Ranked> },
    Candidates(Vec<Candidate>),
    Activities(ActivityPage),
}

/// An [`ApiError`] flattened into what the views need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub not_found: bool,
    /// The backend rejected the session's auth token.
    pub unauthorized: bool,
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Self {
            not_found: err.is_not_found(),
            unauthorized: err.is_unauthorized(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    Loaded { origin: Origin, payload: Payload },
    Failed { origin: Origin, failure: Failure },
    MembershipApplied { page: u64, op: MembershipOp, reply: MembershipReply },
    MembershipFailed { page: u64, op: MembershipOp, failure: Failure },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
