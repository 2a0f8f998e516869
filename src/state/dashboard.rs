use crate::state::messages::{Fetch, Payload};
use crate::state::navigation::{Location, RouteParams, numeric_segment};
use gonawin_api::{RankBy, Ranked, TeamSummary, TournamentSummary, UserShow};
use log::{debug, warn};

/// What the dashboard is summarizing. Detail contexts carry the entity id so
/// moving between two tournaments is a context change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardContext {
    User,
    Tournament(Option<i64>),
    TournamentsIndex,
    Team(Option<i64>),
    TeamsIndex,
    Default,
}

impl DashboardContext {
    pub fn label(&self) -> &'static str {
        match self {
            DashboardContext::User | DashboardContext::Default => "user",
            DashboardContext::Tournament(_) => "tournament",
            DashboardContext::TournamentsIndex => "tournaments index",
            DashboardContext::Team(_) => "team",
            DashboardContext::TeamsIndex => "teams index",
        }
    }
}

struct RouteEntry {
    matches: fn(&str) -> bool,
    context: fn(Option<i64>) -> DashboardContext,
    loader: fn(Option<i64>, Option<i64>) -> Vec<Fetch>,
}

/// First match wins; the last entry catches everything.
static ROUTE_TABLE: [RouteEntry; 6] = [
    RouteEntry { matches: is_root, context: user_context, loader: load_user },
    RouteEntry {
        matches: is_tournament_detail,
        context: DashboardContext::Tournament,
        loader: load_tournament,
    },
    RouteEntry {
        matches: is_tournaments_index,
        context: tournaments_index_context,
        loader: load_user_tournaments,
    },
    RouteEntry { matches: is_team_detail, context: DashboardContext::Team, loader: load_team },
    RouteEntry { matches: is_teams_index, context: teams_index_context, loader: load_user_teams },
    RouteEntry { matches: is_anything, context: default_context, loader: load_user },
];

fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

fn is_tournament_detail(path: &str) -> bool {
    is_detail(path, "tournaments")
}

fn is_tournaments_index(path: &str) -> bool {
    is_index(path, "tournaments")
}

fn is_team_detail(path: &str) -> bool {
    is_detail(path, "teams")
}

fn is_teams_index(path: &str) -> bool {
    is_index(path, "teams")
}

fn is_anything(_: &str) -> bool {
    true
}

fn user_context(_: Option<i64>) -> DashboardContext {
    DashboardContext::User
}

fn tournaments_index_context(_: Option<i64>) -> DashboardContext {
    DashboardContext::TournamentsIndex
}

fn teams_index_context(_: Option<i64>) -> DashboardContext {
    DashboardContext::TeamsIndex
}

fn default_context(_: Option<i64>) -> DashboardContext {
    DashboardContext::Default
}

fn load_user(_: Option<i64>, user_id: Option<i64>) -> Vec<Fetch> {
    current_user(user_id).into_iter().collect()
}

fn load_tournament(id: Option<i64>, user_id: Option<i64>) -> Vec<Fetch> {
    let Some(id) = id else {
        return Vec::new();
    };
    let mut fetches = vec![
        Fetch::Tournament { id },
        Fetch::TournamentRanking { id, rank_by: RankBy::Users },
        Fetch::TournamentRanking { id, rank_by: RankBy::Teams },
    ];
    fetches.extend(current_user(user_id));
    fetches
}

fn load_team(id: Option<i64>, user_id: Option<i64>) -> Vec<Fetch> {
    let Some(id) = id else {
        return Vec::new();
    };
    let mut fetches = vec![Fetch::Team { id }, Fetch::TeamRanking { id }];
    fetches.extend(current_user(user_id));
    fetches
}

fn load_user_tournaments(_: Option<i64>, user_id: Option<i64>) -> Vec<Fetch> {
    match user_id {
        Some(user_id) => vec![Fetch::CurrentUser { user_id }, Fetch::UserTournaments { user_id }],
        None => Vec::new(),
    }
}

fn load_user_teams(_: Option<i64>, user_id: Option<i64>) -> Vec<Fetch> {
    match user_id {
        Some(user_id) => vec![Fetch::CurrentUser { user_id }, Fetch::UserTeams { user_id }],
        None => Vec::new(),
    }
}

fn current_user(user_id: Option<i64>) -> Option<Fetch> {
    user_id.map(|user_id| Fetch::CurrentUser { user_id })
}

/// `/<collection>/<id>...`, with the same notion of id as the location parser.
fn is_detail(path: &str, collection: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|p| p.strip_prefix(collection))
        .and_then(|p| p.strip_prefix('/'))
        .and_then(|rest| numeric_segment(rest.split('/').next().unwrap_or_default()))
        .is_some()
}

/// `/<collection>` or `/<collection>/`
fn is_index(path: &str, collection: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|p| p.strip_prefix(collection))
        .is_some_and(|rest| rest.is_empty() || rest == "/")
}

/// Everything the dashboard panel shows. Each field is filled by its own
/// fetch, so a partially loaded dashboard is visible as such.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub context: Option<DashboardContext>,
    pub name: Option<String>,
    pub id: Option<i64>,
    pub user: Option<String>,
    pub user_id: Option<i64>,
    pub image_url: Option<String>,
    pub score: Option<i64>,
    pub n_teams: Option<usize>,
    pub n_tournaments: Option<usize>,
    pub n_members: Option<usize>,
    pub n_participants: Option<usize>,
    pub accuracy: Option<f64>,
    pub rank_users: Option<Vec<Ranked>>,
    pub rank_teams: Option<Vec<Ranked>>,
    pub members: Option<Vec<Ranked>>,
    pub teams: Option<Vec<TeamSummary>>,
    pub tournaments: Option<Vec<TournamentSummary>>,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    context: Option<DashboardContext>,
    generation: u64,
    refresh_pending: bool,
    /// Parameters of the previous navigation and the route entry it matched.
    /// The id is reused only by a navigation matching the same entry.
    reactive: RouteParams,
    reactive_entry: Option<usize>,
    /// Which tournament ranking the panel shows.
    pub rank_by: RankBy,
    pub view: DashboardView,
}

impl Dashboard {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn context(&self) -> Option<DashboardContext> {
        self.context
    }

    /// Make the next activation fetch even if the context did not change.
    pub fn request_refresh(&mut self) {
        self.refresh_pending = true;
    }

    /// Resolve `location` to a context and return the fetches that populate
    /// it, or `None` when the context is unchanged and no refresh was requested.
    pub fn activate(&mut self, location: &Location, user_id: Option<i64>) -> Option<Vec<Fetch>> {
        let index = ROUTE_TABLE.iter().position(|entry| (entry.matches)(&location.path))?;
        let entry = &ROUTE_TABLE[index];
        let id = match location.params.id {
            Some(id) => Some(id),
            None if self.reactive_entry == Some(index) => self.reactive.id,
            None => None,
        };
        self.reactive = location.params.clone();
        self.reactive_entry = Some(index);

        let context = (entry.context)(id);
        let forced = std::mem::take(&mut self.refresh_pending);

        if self.context == Some(context) && !forced {
            debug!("dashboard already showing {context:?}");
            return None;
        }

        self.context = Some(context);
        self.generation += 1;
        self.view = DashboardView { context: Some(context), ..Default::default() };

        let fetches = (entry.loader)(id, user_id);
        if fetches.is_empty() {
            debug!("dashboard {context:?} has nothing to fetch");
        }
        Some(fetches)
    }

    /// Drop everything, including the ability of in-flight responses to land.
    pub fn reset(&mut self) {
        self.context = None;
        self.generation += 1;
        self.refresh_pending = false;
        self.reactive = RouteParams::default();
        self.reactive_entry = None;
        self.view = DashboardView::default();
    }

    pub fn toggle_rank_by(&mut self) {
        self.rank_by = match self.rank_by {
            RankBy::Users => RankBy::Teams,
            RankBy::Teams => RankBy::Users,
        };
    }

    /// Store one fetch result. Returns false when the response belongs to an
    /// earlier activation and was discarded.
    pub fn apply(&mut self, generation: u64, payload: Payload) -> bool {
        if generation != self.generation {
            warn!(
                "discarding stale dashboard response (generation {generation}, current {})",
                self.generation
            );
            return false;
        }

        let view = &mut self.view;
        match payload {
            Payload::CurrentUser(show) => apply_current_user(view, self.context, show),
            Payload::Tournament(show) => {
                view.name = Some(show.tournament.name);
                view.id = Some(show.tournament.id);
                view.image_url = show.image_url;
                view.n_participants = Some(show.participants.len());
                view.n_teams = Some(show.teams.len());
            }
            Payload::TournamentRanking { rank_by: RankBy::Users, ranked } => {
                view.rank_users = Some(ranked)
            }
            Payload::TournamentRanking { rank_by: RankBy::Teams, ranked } => {
                view.rank_teams = Some(ranked)
            }
            Payload::Team(show) => {
                view.name = Some(show.team.name);
                view.id = Some(show.team.id);
                view.image_url = show.image_url;
                view.n_tournaments = Some(show.team.tournament_ids.len());
                view.n_members = Some(show.players.len());
                view.accuracy = Some(show.team.accuracy);
            }
            Payload::TeamRanking(ranked) => view.members = Some(ranked),
            Payload::UserTeams(teams) => view.teams = Some(teams),
            Payload::UserTournaments(tournaments) => view.tournaments = Some(tournaments),
            Payload::Candidates(_) => {
                debug!("dashboard ignores candidate teams");
                return false;
            }
        }
        true
    }
}

fn apply_current_user(view: &mut DashboardView, context: Option<DashboardContext>, show: UserShow) {
    let user = show.user;
    view.user_id = Some(user.id);

    match context {
        Some(DashboardContext::Tournament(_) | DashboardContext::Team(_)) => {
            view.user = Some(user.display_name().to_string());
        }
        Some(DashboardContext::TournamentsIndex | DashboardContext::TeamsIndex) => {
            view.user = Some(user.display_name().to_string());
            view.name = Some(user.display_name().to_string());
            view.id = Some(user.id);
            view.image_url = show.image_url;
            view.n_tournaments = Some(user.tournament_ids.len());
            view.n_teams = Some(user.team_ids.len());
            view.score = Some(user.score);
        }
        Some(DashboardContext::User | DashboardContext::Default) | None => {
            view.name = Some(user.display_name().to_string());
            view.user = Some(user.name);
            view.id = Some(user.id);
            view.image_url = show.image_url;
            view.n_tournaments = Some(user.tournament_ids.len());
            view.n_teams = Some(user.team_ids.len());
            view.score = Some(user.score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonawin_api::{Tournament, TournamentShow, User};

    fn current_user_show() -> UserShow {
        UserShow {
            user: User {
                id: 5,
                username: "remy".into(),
                name: "Remy Jourde".into(),
                score: 12,
                team_ids: vec![1, 2],
                tournament_ids: vec![42],
                ..Default::default()
            },
            image_url: Some("http://img/5".into()),
        }
    }

    fn tournament_fetches(id: i64) -> Vec<Fetch> {
        vec![
            Fetch::Tournament { id },
            Fetch::TournamentRanking { id, rank_by: RankBy::Users },
            Fetch::TournamentRanking { id, rank_by: RankBy::Teams },
            Fetch::CurrentUser { user_id: 5 },
        ]
    }

    #[test]
    fn root_populates_user_summary() {
        let mut dashboard = Dashboard::default();
        let fetches = dashboard.activate(&Location::parse("/"), Some(5)).unwrap();
        assert_eq!(fetches, vec![Fetch::CurrentUser { user_id: 5 }]);
        assert_eq!(dashboard.context(), Some(DashboardContext::User));

        assert!(dashboard.apply(dashboard.generation(), Payload::CurrentUser(current_user_show())));
        let view = &dashboard.view;
        assert_eq!(view.score, Some(12));
        assert_eq!(view.n_teams, Some(2));
        assert_eq!(view.n_tournaments, Some(1));
        assert_eq!(view.user.as_deref(), Some("Remy Jourde"));
        assert_eq!(view.name.as_deref(), Some("remy"));
    }

    #[test]
    fn tournament_detail_fetches_detail_and_both_rankings_once() {
        let mut dashboard = Dashboard::default();
        let location = Location::parse("/tournaments/42");
        assert_eq!(dashboard.activate(&location, Some(5)), Some(tournament_fetches(42)));
        assert_eq!(dashboard.context(), Some(DashboardContext::Tournament(Some(42))));
        assert_eq!(dashboard.activate(&location, Some(5)), None);
    }

    #[test]
    fn query_change_is_a_no_op_unless_refresh_requested() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/tournaments/42"), Some(5));
        let generation = dashboard.generation();

        let ranking_tab = Location::parse("/tournaments/42?tab=ranking");
        assert_eq!(dashboard.activate(&ranking_tab, Some(5)), None);
        assert_eq!(dashboard.generation(), generation);

        dashboard.request_refresh();
        assert_eq!(dashboard.activate(&ranking_tab, Some(5)), Some(tournament_fetches(42)));
        assert_eq!(dashboard.generation(), generation + 1);

        // The request is consumed by one activation.
        assert_eq!(dashboard.activate(&ranking_tab, Some(5)), None);
    }

    #[test]
    fn switching_tournaments_refetches() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/tournaments/42"), Some(5));
        assert_eq!(
            dashboard.activate(&Location::parse("/tournaments/43"), Some(5)),
            Some(tournament_fetches(43))
        );
    }

    #[test]
    fn indexes_fetch_the_users_lists() {
        let mut dashboard = Dashboard::default();
        assert_eq!(
            dashboard.activate(&Location::parse("/teams/"), Some(5)),
            Some(vec![Fetch::CurrentUser { user_id: 5 }, Fetch::UserTeams { user_id: 5 }])
        );
        assert_eq!(
            dashboard.activate(&Location::parse("/tournaments"), Some(5)),
            Some(vec![
                Fetch::CurrentUser { user_id: 5 },
                Fetch::UserTournaments { user_id: 5 }
            ])
        );
        assert_eq!(
            dashboard.activate(&Location::parse("/teams/3"), Some(5)),
            Some(vec![
                Fetch::Team { id: 3 },
                Fetch::TeamRanking { id: 3 },
                Fetch::CurrentUser { user_id: 5 }
            ])
        );
    }

    #[test]
    fn other_paths_use_default_context() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/"), Some(5));
        assert_eq!(
            dashboard.activate(&Location::parse("/about"), Some(5)),
            Some(vec![Fetch::CurrentUser { user_id: 5 }])
        );
        assert_eq!(dashboard.context(), Some(DashboardContext::Default));
    }

    #[test]
    fn detail_without_any_id_fetches_nothing() {
        let mut dashboard = Dashboard::default();
        let mut location = Location::parse("/tournaments/42");
        location.params.id = None;
        assert_eq!(dashboard.activate(&location, Some(5)), Some(Vec::new()));
    }

    #[test]
    fn previous_id_never_crosses_collections() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/teams/3"), Some(5));

        let mut location = Location::parse("/tournaments/42");
        location.params.id = None;
        assert_eq!(dashboard.activate(&location, Some(5)), Some(Vec::new()));
        assert_eq!(dashboard.context(), Some(DashboardContext::Tournament(None)));
    }

    #[test]
    fn previous_id_is_reused_within_the_same_collection() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/teams/3"), Some(5));

        let mut location = Location::parse("/teams/3/players");
        location.params.id = None;
        dashboard.request_refresh();
        let fetches = dashboard.activate(&location, Some(5)).unwrap();
        assert_eq!(fetches[0], Fetch::Team { id: 3 });
    }

    #[test]
    fn malformed_ids_are_not_detail_routes() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/teams/3"), Some(5));

        for path in ["/tournaments/99999999999999999999", "/tournaments/42abc", "/tournaments/+3"] {
            let fetches = dashboard.activate(&Location::parse(path), Some(5)).unwrap_or_default();
            assert!(!fetches.iter().any(|f| matches!(f, Fetch::Tournament { .. })), "{path}");
            assert_eq!(dashboard.context(), Some(DashboardContext::Default), "{path}");
        }
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/tournaments/42"), Some(5));
        let old = dashboard.generation();
        dashboard.activate(&Location::parse("/teams/3"), Some(5));

        let show = TournamentShow {
            tournament: Tournament { id: 42, name: "World Cup".into(), ..Default::default() },
            ..Default::default()
        };
        assert!(!dashboard.apply(old, Payload::Tournament(show)));
        assert_eq!(dashboard.view.name, None);
    }

    #[test]
    fn fields_fill_independently() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/tournaments/42"), Some(5));
        let generation = dashboard.generation();

        let ranked = vec![Ranked { id: 7, name: "Sevens".into(), score: 30 }];
        dashboard.apply(
            generation,
            Payload::TournamentRanking { rank_by: RankBy::Teams, ranked: ranked.clone() },
        );
        assert_eq!(dashboard.view.rank_teams, Some(ranked));
        assert_eq!(dashboard.view.rank_users, None);
        assert_eq!(dashboard.view.name, None);

        dashboard.apply(generation, Payload::CurrentUser(current_user_show()));
        assert_eq!(dashboard.view.user.as_deref(), Some("remy"));
        assert_eq!(dashboard.view.score, None);
    }

    #[test]
    fn reset_invalidates_in_flight_responses() {
        let mut dashboard = Dashboard::default();
        dashboard.activate(&Location::parse("/"), Some(5));
        let generation = dashboard.generation();
        dashboard.reset();
        assert!(!dashboard.apply(generation, Payload::CurrentUser(current_user_show())));
        assert_eq!(dashboard.context(), None);
    }
}
