use crate::state::dashboard::Dashboard;
use crate::state::membership::{MembershipToggle, Target};
use crate::state::navigation::{Navigator, Route};
use chrono::Local;
use log::debug;
use gonawin_api::{Activity, ActivityPage, Candidate, Collective, TeamShow, TournamentShow};

// ---------------------------------------------------------------------------
// Team page
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TeamPage {
    pub id: i64,
    pub team: Option<TeamShow>,
    pub toggle: MembershipToggle,
    pub error: Option<String>,
}

impl TeamPage {
    pub fn new(id: i64) -> Self {
        Self { id, team: None, toggle: MembershipToggle::new(Collective::Team(id)), error: None }
    }

    pub fn on_team_loaded(&mut self, show: TeamShow) {
        self.error = None;
        self.toggle.resolve(Target::Team(&show));
        self.team = Some(show);
    }
}

// ---------------------------------------------------------------------------
// Tournament page
// ---------------------------------------------------------------------------

/// One team the current user administers, with its own join/leave toggle.
#[derive(Debug)]
pub struct CandidateToggle {
    pub candidate: Candidate,
    pub toggle: MembershipToggle,
}

#[derive(Debug)]
pub struct TournamentPage {
    pub id: i64,
    pub tab: Option<String>,
    pub tournament: Option<TournamentShow>,
    pub toggle: MembershipToggle,
    pub candidates: Vec<CandidateToggle>,
    /// 0 selects the tournament toggle, `n` the n-th candidate.
    pub selected: usize,
    pub error: Option<String>,
}

impl TournamentPage {
    pub fn new(id: i64, tab: Option<String>) -> Self {
        Self {
            id,
            tab,
            tournament: None,
            toggle: MembershipToggle::new(Collective::Tournament(id)),
            candidates: Vec::new(),
            selected: 0,
            error: None,
        }
    }

    pub fn on_tournament_loaded(&mut self, show: TournamentShow) {
        self.error = None;
        self.toggle.resolve(Target::Tournament(&show));
        for candidate in &mut self.candidates {
            candidate.toggle.resolve(Target::Tournament(&show));
        }
        self.tournament = Some(show);
    }

    pub fn on_candidates_loaded(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates
            .into_iter()
            .map(|candidate| {
                let mut toggle = MembershipToggle::new(Collective::TournamentAsTeam {
                    tournament_id: self.id,
                    team_id: candidate.team.id,
                });
                if let Some(show) = &self.tournament {
                    toggle.resolve(Target::Tournament(show));
                }
                CandidateToggle { candidate, toggle }
            })
            .collect();
        self.selected = self.selected.min(self.candidates.len());
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % (self.candidates.len() + 1);
    }

    pub fn select_prev(&mut self) {
        let count = self.candidates.len() + 1;
        self.selected = (self.selected + count - 1) % count;
    }

    pub fn selected_toggle_mut(&mut self) -> &mut MembershipToggle {
        match self.selected.checked_sub(1).and_then(|i| self.candidates.get_mut(i)) {
            Some(candidate) => &mut candidate.toggle,
            None => &mut self.toggle,
        }
    }

    fn toggle_for(&mut self, collective: Collective) -> Option<&mut MembershipToggle> {
        if self.toggle.collective == collective {
            return Some(&mut self.toggle);
        }
        self.candidates
            .iter_mut()
            .map(|c| &mut c.toggle)
            .find(|t| t.collective == collective)
    }
}

// ---------------------------------------------------------------------------
// Index pages
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct IndexPage {
    pub selected: usize,
}

impl IndexPage {
    pub fn select_next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Activities page
// ---------------------------------------------------------------------------

/// The activity feed, grown one backend page at a time.
#[derive(Debug, Default)]
pub struct ActivitiesPage {
    pub activities: Vec<Activity>,
    /// Last page loaded, 0 before the first one lands.
    pub page: u32,
    pub more: bool,
    /// A page request is outstanding.
    pub loading: bool,
    pub selected: usize,
    pub error: Option<String>,
}

impl ActivitiesPage {
    pub fn on_page_loaded(&mut self, loaded: ActivityPage) {
        self.loading = false;
        self.error = None;
        if loaded.current_page <= self.page {
            debug!("activity page {} already shown", loaded.current_page);
            return;
        }
        self.page = loaded.current_page;
        self.more = loaded.has_more();
        self.activities.extend(loaded.activities);
    }

    /// The page to ask for next, or `None` when the feed is exhausted or a
    /// request is already out.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.loading || (self.page > 0 && !self.more) {
            return None;
        }
        self.loading = true;
        Some(self.page + 1)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.activities.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub enum Page {
    #[default]
    Home,
    Welcome,
    About,
    GettingStarted,
    SignIn,
    NotFound,
    Passive,
    Teams(IndexPage),
    Tournaments(IndexPage),
    Team(TeamPage),
    Tournament(TournamentPage),
    Activities(ActivitiesPage),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Welcome,
    About,
    GettingStarted,
    SignIn,
    NotFound,
    Passive,
    Teams,
    Tournaments,
    Team,
    Tournament,
    Activities,
}

impl Page {
    pub fn for_route(route: Route, tab: Option<String>) -> Self {
        match route {
            Route::Home | Route::Unknown => Page::Home,
            Route::Welcome => Page::Welcome,
            Route::About => Page::About,
            Route::GettingStarted => Page::GettingStarted,
            Route::SignIn => Page::SignIn,
            Route::NotFound => Page::NotFound,
            Route::Passive => Page::Passive,
            Route::Teams => Page::Teams(IndexPage::default()),
            Route::Tournaments => Page::Tournaments(IndexPage::default()),
            Route::Team(id) => Page::Team(TeamPage::new(id)),
            Route::Tournament(id) => Page::Tournament(TournamentPage::new(id, tab)),
            Route::Activities => Page::Activities(ActivitiesPage::default()),
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Page::Home => PageKind::Home,
            Page::Welcome => PageKind::Welcome,
            Page::About => PageKind::About,
            Page::GettingStarted => PageKind::GettingStarted,
            Page::SignIn => PageKind::SignIn,
            Page::NotFound => PageKind::NotFound,
            Page::Passive => PageKind::Passive,
            Page::Teams(_) => PageKind::Teams,
            Page::Tournaments(_) => PageKind::Tournaments,
            Page::Team(_) => PageKind::Team,
            Page::Tournament(_) => PageKind::Tournament,
            Page::Activities(_) => PageKind::Activities,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Welcome => "Welcome",
            Page::About => "About",
            Page::GettingStarted => "Getting started",
            Page::SignIn => "Sign in",
            Page::NotFound => "Not found",
            Page::Passive => "Dashboard",
            Page::Teams(_) => "Teams",
            Page::Tournaments(_) => "Tournaments",
            Page::Team(_) => "Team",
            Page::Tournament(_) => "Tournament",
            Page::Activities(_) => "Activities",
        }
    }

    /// The toggle a membership operation belongs to, if this page hosts it.
    pub fn toggle_for(&mut self, collective: Collective) -> Option<&mut MembershipToggle> {
        match self {
            Page::Team(page) if page.toggle.collective == collective => Some(&mut page.toggle),
            Page::Tournament(page) => page.toggle_for(collective),
            _ => None,
        }
    }

    pub fn set_error(&mut self, message: String) {
        match self {
            Page::Team(page) => page.error = Some(message),
            Page::Tournament(page) => page.error = Some(message),
            Page::Activities(page) => {
                page.loading = false;
                page.error = Some(message);
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Status line, prompts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub text: String,
    pub at: String,
    pub is_error: bool,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), at: Local::now().format("%H:%M").to_string(), is_error: false }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { is_error: true, ..Self::info(text) }
    }
}

/// A leave waiting for the user to say yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLeave {
    pub page: u64,
    pub collective: Collective,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub navigator: Navigator,
    pub page: Page,
    /// Bumped on every page entry; tags page fetches.
    pub page_generation: u64,
    pub dashboard: Dashboard,
    pub confirm_leave: Option<PendingLeave>,
    /// Text typed into the location bar, when open.
    pub location_input: Option<String>,
    pub status: Option<StatusLine>,
    pub show_help: bool,
    pub show_logs: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonawin_api::{MembershipAction, TeamSummary, Tournament};

    fn candidate(id: i64) -> Candidate {
        Candidate { team: TeamSummary { id, name: format!("team {id}") }, joined: false }
    }

    #[test]
    fn candidates_resolve_whenever_tournament_arrives() {
        let show = TournamentShow {
            tournament: Tournament { id: 42, ..Default::default() },
            teams: vec![TeamSummary { id: 7, name: "Sevens".into() }],
            ..Default::default()
        };

        let mut page = TournamentPage::new(42, None);
        page.on_candidates_loaded(vec![candidate(7), candidate(8)]);
        assert_eq!(page.candidates[0].toggle.label(), None);
        page.on_tournament_loaded(show.clone());
        assert_eq!(page.candidates[0].toggle.label(), Some("Leave"));
        assert_eq!(page.candidates[1].toggle.label(), Some("Join"));

        let mut page = TournamentPage::new(42, None);
        page.on_tournament_loaded(show);
        page.on_candidates_loaded(vec![candidate(7), candidate(8)]);
        assert_eq!(page.candidates[0].toggle.label(), Some("Leave"));
        assert_eq!(page.candidates[1].toggle.label(), Some("Join"));
    }

    #[test]
    fn selection_cycles_through_toggles() {
        let mut page = TournamentPage::new(42, None);
        page.on_candidates_loaded(vec![candidate(7), candidate(8)]);
        page.on_tournament_loaded(TournamentShow {
            tournament: Tournament { id: 42, ..Default::default() },
            ..Default::default()
        });

        assert_eq!(page.selected_toggle_mut().collective, Collective::Tournament(42));
        page.select_next();
        page.select_next();
        assert_eq!(
            page.selected_toggle_mut().collective,
            Collective::TournamentAsTeam { tournament_id: 42, team_id: 8 }
        );
        page.select_next();
        assert_eq!(page.selected, 0);
        page.select_prev();
        assert_eq!(page.selected, 2);

        let op = page.selected_toggle_mut().click().unwrap();
        assert_eq!(op.action, MembershipAction::Join);
    }

    fn activity_page(current_page: u32, last_page: u32, ids: &[i64]) -> ActivityPage {
        ActivityPage {
            activities: ids.iter().map(|&id| Activity { id, ..Default::default() }).collect(),
            current_page,
            last_page,
        }
    }

    #[test]
    fn activities_accumulate_until_the_last_page() {
        let mut page = ActivitiesPage::default();
        assert_eq!(page.next_page(), Some(1));
        assert_eq!(page.next_page(), None);

        page.on_page_loaded(activity_page(1, 2, &[1, 2]));
        assert!(page.more);
        assert_eq!(page.next_page(), Some(2));

        page.on_page_loaded(activity_page(2, 2, &[3]));
        let ids: Vec<i64> = page.activities.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!page.more);
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn repeated_activity_page_is_not_appended_twice() {
        let mut page = ActivitiesPage::default();
        page.next_page();
        page.on_page_loaded(activity_page(1, 3, &[1, 2]));
        page.on_page_loaded(activity_page(1, 3, &[1, 2]));
        assert_eq!(page.activities.len(), 2);
    }

    #[test]
    fn failed_activity_page_can_be_retried() {
        let mut page = Page::Activities(ActivitiesPage::default());
        if let Page::Activities(p) = &mut page {
            assert_eq!(p.next_page(), Some(1));
        }
        page.set_error("boom".into());
        if let Page::Activities(p) = &mut page {
            assert_eq!(p.error.as_deref(), Some("boom"));
            assert_eq!(p.next_page(), Some(1));
        }
    }

    #[test]
    fn page_routes_replies_to_matching_toggle() {
        let mut page = Page::Tournament(TournamentPage::new(42, None));
        if let Page::Tournament(p) = &mut page {
            p.on_candidates_loaded(vec![candidate(7)]);
        }
        let collective = Collective::TournamentAsTeam { tournament_id: 42, team_id: 7 };
        assert!(page.toggle_for(collective).is_some());
        assert!(page.toggle_for(Collective::Team(7)).is_none());
    }
}
