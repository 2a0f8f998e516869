/// Wire types for the gonawin backend JSON API.
/// The backend serializes Go structs as-is: PascalCase keys, `omitempty` everywhere,
/// so every field is optional and every struct falls back to its default.
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, rename_all = "PascalCase")]
pub struct WireUser {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub auth: Option<String>,
    pub score: Option<i64>,
    pub team_ids: Option<Vec<i64>>,
    pub tournament_ids: Option<Vec<i64>>,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, rename_all = "PascalCase")]
pub struct WireTeam {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub admin_ids: Option<Vec<i64>>,
    pub private: Option<bool>,
    pub tournament_ids: Option<Vec<i64>>,
    pub accuracy: Option<f64>,
    pub score: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, rename_all = "PascalCase")]
pub struct WireTournament {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub admin_ids: Option<Vec<i64>>,
    pub participants_count: Option<usize>,
    pub teams_count: Option<usize>,
    pub progress: Option<f64>,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct UserEnvelope {
    pub user: Option<WireUser>,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct TeamEnvelope {
    pub team: Option<WireTeam>,
    pub joined: Option<bool>,
    pub request_sent: Option<bool>,
    pub players: Option<Vec<WireUser>>,
    pub tournaments: Option<Vec<WireTournament>>,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct TournamentEnvelope {
    pub tournament: Option<WireTournament>,
    pub joined: Option<bool>,
    pub participants: Option<Vec<WireUser>>,
    pub teams: Option<Vec<WireTeam>>,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
}

/// `j/users/:id/teams`, and the team half of ranking responses.
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct TeamsEnvelope {
    pub teams: Option<Vec<WireTeam>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct TournamentsEnvelope {
    pub tournaments: Option<Vec<WireTournament>>,
}

/// `j/*/:id/ranking?rankby=...` answers with whichever list was asked for.
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct RankingEnvelope {
    pub users: Option<Vec<WireUser>>,
    pub teams: Option<Vec<WireTeam>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct CandidatesEnvelope {
    pub candidates: Option<Vec<WireCandidate>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct WireCandidate {
    pub team: Option<WireTeam>,
    pub joined: Option<bool>,
}

/// Join/leave answer. The entity part is ignored: callers re-fetch.
#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct MessageEnvelope {
    pub message_info: Option<String>,
}

/// Membership endpoints answer with an envelope, except the invitation
/// request which answers with a bare JSON string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageReply {
    Text(String),
    Envelope(MessageEnvelope),
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, rename_all = "PascalCase")]
pub struct WireActivityEntity {
    pub id: Option<i64>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, rename_all = "PascalCase")]
pub struct WireActivity {
    pub id: Option<i64>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub verb: Option<String>,
    pub actor: Option<WireActivityEntity>,
    pub object: Option<WireActivityEntity>,
    pub target: Option<WireActivityEntity>,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct ActivitiesResults {
    pub activities: Option<Vec<WireActivity>>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct ActivitiesEnvelope {
    pub results: Option<ActivitiesResults>,
}

/// `j/activities` is either paged or, on older backends, a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ActivitiesReply {
    List(Vec<WireActivity>),
    Paged(ActivitiesEnvelope),
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TwitterTokenEnvelope {
    #[serde(rename = "OAuthToken")]
    pub oauth_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoginUrlEnvelope {
    pub url: Option<String>,
}
