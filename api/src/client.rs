use crate::wire::{
    ActivitiesReply, CandidatesEnvelope, LoginUrlEnvelope, MessageReply, RankingEnvelope,
    TeamEnvelope, TeamsEnvelope, TournamentEnvelope, TournamentsEnvelope, TwitterTokenEnvelope,
    UserEnvelope, WireActivity, WireActivityEntity, WireTeam, WireTournament, WireUser,
};
use crate::{
    Activity, ActivityEntity, ActivityPage, Candidate, MembershipOp, MembershipReply, RankBy,
    Ranked, SignedInUser, Team, TeamShow, TeamSummary, Tournament, TournamentShow,
    TournamentSummary, User, UserShow,
};
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use std::fmt;
use std::time::Duration;
use urlencoding::encode;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const TWITTER_AUTHENTICATE: &str = "https://api.twitter.com/oauth/authenticate";
/// Related records the backend embeds in the current-user envelope.
const CURRENT_USER_INCLUDES: &str = "Teams TeamRequests Invitations";
pub const RANKING_LIMIT: usize = 10;
pub const ACTIVITIES_PER_PAGE: usize = 20;

/// gonawin backend client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GonawinApi {
    client: Client,
    base_url: String,
    auth: Option<String>,
    timeout: Duration,
}

impl Default for GonawinApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    /// Non-2xx answer; `message` is the backend's payload.
    Api { status: u16, url: String, message: String },
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// The backend refused the auth token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Api { status: 401 | 403, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api { status, url, message } => {
                if message.is_empty() {
                    write!(f, "HTTP {status} for {url}")
                } else {
                    f.write_str(message)
                }
            }
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(url) => write!(f, "Not found: {url}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl GonawinApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("gonawin/", env!("CARGO_PKG_VERSION"), " (terminal client)"))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Attach the backend auth token sent as `Authorization` on every call.
    pub fn with_auth(mut self, auth: Option<String>) -> Self {
        self.auth = auth;
        self
    }

    pub fn set_auth(&mut self, auth: Option<String>) {
        self.auth = auth;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub async fn fetch_user(&self, id: i64) -> ApiResult<UserShow> {
        let path = format!("j/users/show/{id}?including={}", encode(CURRENT_USER_INCLUDES));
        let raw: UserEnvelope = self.get(&path).await?;
        Ok(UserShow {
            user: map_user(raw.user.unwrap_or_default()),
            image_url: raw.image_url,
        })
    }

    pub async fn fetch_user_teams(&self, id: i64) -> ApiResult<Vec<TeamSummary>> {
        let raw: TeamsEnvelope = self.get(&format!("j/users/{id}/teams")).await?;
        Ok(raw.teams.unwrap_or_default().into_iter().map(map_team_summary).collect())
    }

    pub async fn fetch_user_tournaments(&self, id: i64) -> ApiResult<Vec<TournamentSummary>> {
        let raw: TournamentsEnvelope = self.get(&format!("j/users/{id}/tournaments")).await?;
        Ok(raw
            .tournaments
            .unwrap_or_default()
            .into_iter()
            .map(map_tournament_summary)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub async fn fetch_team(&self, id: i64) -> ApiResult<TeamShow> {
        let raw: TeamEnvelope = self.get(&format!("j/teams/show/{id}")).await?;
        Ok(TeamShow {
            team: map_team(raw.team.unwrap_or_default()),
            joined: raw.joined.unwrap_or(false),
            request_sent: raw.request_sent.unwrap_or(false),
            players: raw.players.unwrap_or_default().into_iter().map(map_user).collect(),
            tournaments: raw
                .tournaments
                .unwrap_or_default()
                .into_iter()
                .map(map_tournament_summary)
                .collect(),
            image_url: raw.image_url,
        })
    }

    /// Team members ordered by score.
    pub async fn fetch_team_ranking(&self, id: i64, limit: usize) -> ApiResult<Vec<Ranked>> {
        let path = format!("j/teams/{id}/ranking?rankby=users&limit={limit}");
        let raw: RankingEnvelope = self.get(&path).await?;
        Ok(raw.users.unwrap_or_default().into_iter().map(map_ranked_user).collect())
    }

    // -----------------------------------------------------------------------
    // Tournaments
    // -----------------------------------------------------------------------

    pub async fn fetch_tournament(&self, id: i64) -> ApiResult<TournamentShow> {
        let raw: TournamentEnvelope = self.get(&format!("j/tournaments/show/{id}")).await?;
        Ok(TournamentShow {
            tournament: map_tournament(raw.tournament.unwrap_or_default()),
            joined: raw.joined.unwrap_or(false),
            participants: raw.participants.unwrap_or_default().into_iter().map(map_user).collect(),
            teams: raw.teams.unwrap_or_default().into_iter().map(map_team_summary).collect(),
            image_url: raw.image_url,
        })
    }

    pub async fn fetch_tournament_ranking(
        &self,
        id: i64,
        rank_by: RankBy,
        limit: usize,
    ) -> ApiResult<Vec<Ranked>> {
        let path = format!(
            "j/tournaments/{id}/ranking?rankby={}&limit={limit}",
            rank_by.as_str()
        );
        let raw: RankingEnvelope = self.get(&path).await?;
        let ranked = match rank_by {
            RankBy::Users => raw.users.unwrap_or_default().into_iter().map(map_ranked_user).collect(),
            RankBy::Teams => raw.teams.unwrap_or_default().into_iter().map(map_ranked_team).collect(),
        };
        Ok(ranked)
    }

    /// Teams the current user administers, with whether each already takes part.
    pub async fn fetch_candidates(&self, tournament_id: i64) -> ApiResult<Vec<Candidate>> {
        let raw: CandidatesEnvelope = self
            .get(&format!("j/tournaments/{tournament_id}/candidates"))
            .await?;
        Ok(raw
            .candidates
            .unwrap_or_default()
            .into_iter()
            .map(|c| Candidate {
                team: map_team_summary(c.team.unwrap_or_default()),
                joined: c.joined.unwrap_or(false),
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    pub async fn apply_membership(&self, op: &MembershipOp) -> ApiResult<MembershipReply> {
        let path = op.path().ok_or_else(|| {
            ApiError::Other(format!("{:?} is not possible on {:?}", op.action, op.collective))
        })?;
        let message_info = match self.post::<MessageReply>(&path).await? {
            MessageReply::Text(text) => Some(text),
            MessageReply::Envelope(raw) => raw.message_info,
        };
        Ok(MembershipReply { message_info: message_info.filter(|m| !m.is_empty()) })
    }

    // -----------------------------------------------------------------------
    // Activities
    // -----------------------------------------------------------------------

    /// One page of the current user's activity feed. Pages start at 1.
    pub async fn fetch_activities(&self, count: usize, page: u32) -> ApiResult<ActivityPage> {
        let raw: ActivitiesReply = self.get(&format!("j/activities?count={count}&page={page}")).await?;
        let activity_page = match raw {
            ActivitiesReply::List(list) => ActivityPage {
                activities: list.into_iter().map(map_activity).collect(),
                current_page: page,
                last_page: page,
            },
            ActivitiesReply::Paged(envelope) => {
                let results = envelope.results.unwrap_or_default();
                ActivityPage {
                    activities: results
                        .activities
                        .unwrap_or_default()
                        .into_iter()
                        .map(map_activity)
                        .collect(),
                    current_page: results.current_page.unwrap_or(page),
                    last_page: results.last_page.unwrap_or(page),
                }
            }
        };
        Ok(activity_page)
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    pub async fn fetch_google_login_url(&self) -> ApiResult<String> {
        let raw: LoginUrlEnvelope = self.get("j/auth/googleloginurl").await?;
        raw.url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::Other("backend returned no Google login url".into()))
    }

    pub async fn fetch_google_user(&self, auth_token: &str) -> ApiResult<SignedInUser> {
        let path = format!("j/auth/google/user/?auth_token={}", encode(auth_token));
        let raw: UserEnvelope = self.get(&path).await?;
        signed_in(raw)
    }

    /// Ask the backend for temporary Twitter credentials and build the
    /// authorization URL the user has to visit.
    pub async fn fetch_twitter_login_url(&self) -> ApiResult<String> {
        let raw: TwitterTokenEnvelope = self.get("j/auth/twitter").await?;
        let token = raw
            .oauth_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Other("backend returned no Twitter oauth token".into()))?;
        Ok(format!("{TWITTER_AUTHENTICATE}?oauth_token={}", encode(&token)))
    }

    pub async fn fetch_twitter_user(
        &self,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> ApiResult<SignedInUser> {
        let path = format!(
            "j/auth/twitter/user/?oauth_token={}&oauth_verifier={}",
            encode(oauth_token),
            encode(oauth_verifier)
        );
        let raw: UserEnvelope = self.get(&path).await?;
        signed_in(raw)
    }

    pub async fn fetch_facebook_user(
        &self,
        access_token: &str,
        id: &str,
        name: &str,
        email: &str,
    ) -> ApiResult<SignedInUser> {
        let path = format!(
            "j/auth?access_token={}&provider=facebook&id={}&name={}&email={}",
            encode(access_token),
            encode(id),
            encode(name),
            encode(email)
        );
        let raw: UserEnvelope = self.get(&path).await?;
        signed_in(raw)
    }

    pub async fn delete_google_cookie(&self) -> ApiResult<()> {
        self.send(Method::GET, "j/auth/google/deletecookie").await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        self.send(Method::GET, path)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url))
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        self.send(Method::POST, path)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url))
    }

    async fn send(&self, method: Method, path: &str) -> ApiResult<reqwest::Response> {
        let url = self.url(path);
        debug!("{method} {url}");

        let mut request = self.client.request(method, &url).timeout(self.timeout);
        if let Some(auth) = self.auth.as_deref() {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url));
        }
        let message = response.text().await.unwrap_or_default().trim().to_owned();
        Err(ApiError::Api { status: status.as_u16(), url, message })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire envelopes → clean domain types
// ---------------------------------------------------------------------------

fn signed_in(raw: UserEnvelope) -> ApiResult<SignedInUser> {
    let user = raw
        .user
        .map(map_user)
        .filter(|u| u.id != 0)
        .ok_or_else(|| ApiError::Other("sign-in returned no user".into()))?;
    Ok(SignedInUser { user, access_token: raw.access_token.filter(|t| !t.is_empty()) })
}

fn map_user(u: WireUser) -> User {
    User {
        id: u.id.unwrap_or_default(),
        username: u.username.unwrap_or_default(),
        name: u.name.unwrap_or_default(),
        alias: u.alias.unwrap_or_default(),
        email: u.email.unwrap_or_default(),
        score: u.score.unwrap_or_default(),
        team_ids: u.team_ids.unwrap_or_default(),
        tournament_ids: u.tournament_ids.unwrap_or_default(),
        auth: u.auth.filter(|a| !a.is_empty()),
        created: u.created,
    }
}

fn map_team(t: WireTeam) -> Team {
    Team {
        id: t.id.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        description: t.description.unwrap_or_default(),
        admin_ids: t.admin_ids.unwrap_or_default(),
        private: t.private.unwrap_or(false),
        tournament_ids: t.tournament_ids.unwrap_or_default(),
        accuracy: t.accuracy.unwrap_or_default(),
    }
}

fn map_team_summary(t: WireTeam) -> TeamSummary {
    TeamSummary { id: t.id.unwrap_or_default(), name: t.name.unwrap_or_default() }
}

fn map_tournament(t: WireTournament) -> Tournament {
    Tournament {
        id: t.id.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        description: t.description.unwrap_or_default(),
        admin_ids: t.admin_ids.unwrap_or_default(),
    }
}

fn map_tournament_summary(t: WireTournament) -> TournamentSummary {
    TournamentSummary {
        id: t.id.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        participants_count: t.participants_count.unwrap_or_default(),
        teams_count: t.teams_count.unwrap_or_default(),
        progress: t.progress.unwrap_or_default(),
    }
}

fn map_ranked_user(u: WireUser) -> Ranked {
    // Ranking rows only carry Id, Name and Score; fall back to the username.
    let name = u.name.filter(|n| !n.is_empty()).or(u.username).unwrap_or_default();
    Ranked { id: u.id.unwrap_or_default(), name, score: u.score.unwrap_or_default() }
}

fn map_activity(a: WireActivity) -> Activity {
    Activity {
        id: a.id.unwrap_or_default(),
        kind: a.kind.unwrap_or_default(),
        verb: a.verb.unwrap_or_default(),
        actor: a.actor.map(map_activity_entity).unwrap_or_default(),
        object: a.object.map(map_activity_entity),
        target: a.target.map(map_activity_entity),
        published: a.published,
    }
}

fn map_activity_entity(e: WireActivityEntity) -> ActivityEntity {
    ActivityEntity {
        id: e.id.unwrap_or_default(),
        kind: e.kind.unwrap_or_default(),
        display_name: e.display_name.unwrap_or_default(),
    }
}

fn map_ranked_team(t: WireTeam) -> Ranked {
    Ranked {
        id: t.id.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        score: t.score.unwrap_or_default(),
    }
}
