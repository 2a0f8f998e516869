use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Page, PendingLeave, StatusLine};
use crate::state::membership::MembershipToggle;
use crate::state::messages::{Failure, Fetch, NetworkRequest, Origin, Payload};
use crate::state::navigation::{Location, NOT_FOUND, ROOT, Route, WELCOME};
use crate::state::session::{Provider, SessionContext};
use gonawin_api::{MembershipAction, MembershipOp, MembershipReply};
use log::{debug, warn};

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub session: SessionContext,
}

impl App {
    pub fn new(settings: AppSettings, session: SessionContext) -> Self {
        let app = Self { state: AppState::new(), settings, session };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn on_started(&mut self) -> Vec<NetworkRequest> {
        let url = self.state.navigator.current().url.clone();
        self.navigate_and_reload(&url)
    }

    pub fn navigate(&mut self, url: &str) -> Vec<NetworkRequest> {
        let logged_in = self.session.is_logged_in();
        let location = self.state.navigator.go(url, logged_in).clone();
        self.enter(location, false)
    }

    fn navigate_and_reload(&mut self, url: &str) -> Vec<NetworkRequest> {
        let logged_in = self.session.is_logged_in();
        let location = self.state.navigator.go(url, logged_in).clone();
        self.enter(location, true)
    }

    pub fn back(&mut self) -> Vec<NetworkRequest> {
        let logged_in = self.session.is_logged_in();
        match self.state.navigator.back(logged_in).cloned() {
            Some(location) => self.enter(location, false),
            None => Vec::new(),
        }
    }

    /// Reload the page and force the dashboard to fetch again.
    pub fn refresh(&mut self) -> Vec<NetworkRequest> {
        self.state.dashboard.request_refresh();
        let location = self.state.navigator.current().clone();
        self.enter(location, true)
    }

    fn enter(&mut self, location: Location, reload: bool) -> Vec<NetworkRequest> {
        let route = location.route();
        let mut requests = Vec::new();

        // A query change on the tournament page keeps the page as it is.
        let same_tournament = matches!(
            (&self.state.page, route),
            (Page::Tournament(page), Route::Tournament(id)) if page.id == id
        );
        if same_tournament && !reload {
            if let Page::Tournament(page) = &mut self.state.page {
                page.tab = location.params.tab.clone();
            }
        } else {
            self.state.page_generation += 1;
            self.state.page = Page::for_route(route, location.params.tab.clone());
            self.state.confirm_leave = None;
            debug!("entered {} (page generation {})", location.url, self.state.page_generation);
            requests.extend(self.page_fetches(false));
        }

        requests.extend(self.dashboard_fetches(&location));
        requests
    }

    fn page_fetches(&mut self, refetch: bool) -> Vec<NetworkRequest> {
        let origin = Origin::Page(self.state.page_generation);
        let fetches = match &mut self.state.page {
            Page::Team(page) => vec![Fetch::Team { id: page.id }],
            Page::Tournament(page) if refetch => vec![Fetch::Tournament { id: page.id }],
            Page::Tournament(page) => {
                vec![Fetch::Tournament { id: page.id }, Fetch::Candidates { id: page.id }]
            }
            Page::Activities(page) => {
                page.next_page().map(|page| Fetch::Activities { page }).into_iter().collect()
            }
            _ => Vec::new(),
        };
        fetches.into_iter().map(|fetch| NetworkRequest::Fetch { origin, fetch }).collect()
    }

    /// Ask for the next page of the activity feed.
    pub fn more_activities(&mut self) -> Vec<NetworkRequest> {
        let origin = Origin::Page(self.state.page_generation);
        let Page::Activities(page) = &mut self.state.page else {
            return Vec::new();
        };
        match page.next_page() {
            Some(next) => {
                vec![NetworkRequest::Fetch { origin, fetch: Fetch::Activities { page: next } }]
            }
            None => {
                debug!("no more activities to load");
                Vec::new()
            }
        }
    }

    fn dashboard_fetches(&mut self, location: &Location) -> Vec<NetworkRequest> {
        let user_id = self.session.user_id();
        let Some(fetches) = self.state.dashboard.activate(location, user_id) else {
            return Vec::new();
        };
        let origin = Origin::Dashboard(self.state.dashboard.generation());
        fetches.into_iter().map(|fetch| NetworkRequest::Fetch { origin, fetch }).collect()
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_loaded(&mut self, origin: Origin, payload: Payload) -> Vec<NetworkRequest> {
        match origin {
            Origin::Dashboard(generation) => {
                if generation == self.state.dashboard.generation()
                    && let Payload::CurrentUser(show) = &payload
                    && !self.session.confirm_identity(&show.user)
                {
                    self.state.status =
                        Some(StatusLine::error("Signed-in user does not match the session"));
                    return self.end_session(false);
                }
                self.state.dashboard.apply(generation, payload);
            }
            Origin::Page(generation) => {
                if generation != self.state.page_generation {
                    warn!(
                        "discarding stale page response (generation {generation}, current {})",
                        self.state.page_generation
                    );
                    return Vec::new();
                }
                match (&mut self.state.page, payload) {
                    (Page::Team(page), Payload::Team(show)) => page.on_team_loaded(show),
                    (Page::Tournament(page), Payload::Tournament(show)) => {
                        page.on_tournament_loaded(show)
                    }
                    (Page::Tournament(page), Payload::Candidates(candidates)) => {
                        page.on_candidates_loaded(candidates)
                    }
                    (Page::Activities(page), Payload::Activities(loaded)) => {
                        page.on_page_loaded(loaded)
                    }
                    (page, payload) => debug!("{} page ignores {payload:?}", page.title()),
                }
            }
        }
        Vec::new()
    }

    pub fn on_failed(&mut self, origin: Origin, failure: Failure) -> Vec<NetworkRequest> {
        let current = match origin {
            Origin::Dashboard(generation) => generation == self.state.dashboard.generation(),
            Origin::Page(generation) => generation == self.state.page_generation,
        };
        if !current {
            warn!("discarding stale failure for {origin:?}: {}", failure.message);
            return Vec::new();
        }
        if failure.unauthorized {
            warn!("backend rejected the session for {origin:?}: {}", failure.message);
            self.session.teardown();
            self.state.status = Some(StatusLine::error("Session expired, please sign in again"));
            return self.end_session(false);
        }
        if failure.not_found {
            return self.navigate(NOT_FOUND);
        }
        if let Origin::Page(_) = origin {
            self.state.page.set_error(failure.message.clone());
        }
        self.state.status = Some(StatusLine::error(failure.message));
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Press the focused join/leave button. Leaving waits for confirmation.
    pub fn toggle_membership(&mut self) -> Vec<NetworkRequest> {
        let page_generation = self.state.page_generation;
        let toggle = match &mut self.state.page {
            Page::Team(page) => &mut page.toggle,
            Page::Tournament(page) => page.selected_toggle_mut(),
            _ => return Vec::new(),
        };

        if toggle.action() == Some(MembershipAction::Leave) && !toggle.is_submitting() {
            self.state.confirm_leave =
                Some(PendingLeave { page: page_generation, collective: toggle.collective });
            return Vec::new();
        }

        toggle
            .click()
            .map(|op| NetworkRequest::Membership { page: page_generation, op })
            .into_iter()
            .collect()
    }

    pub fn answer_leave(&mut self, confirmed: bool) -> Vec<NetworkRequest> {
        let Some(pending) = self.state.confirm_leave.take() else {
            return Vec::new();
        };
        if !confirmed || pending.page != self.state.page_generation {
            return Vec::new();
        }
        let Some(toggle) = self.state.page.toggle_for(pending.collective) else {
            return Vec::new();
        };
        if toggle.action() != Some(MembershipAction::Leave) {
            return Vec::new();
        }
        toggle
            .click()
            .map(|op| NetworkRequest::Membership { page: pending.page, op })
            .into_iter()
            .collect()
    }

    pub fn on_membership_applied(
        &mut self,
        page: u64,
        op: MembershipOp,
        reply: MembershipReply,
    ) -> Vec<NetworkRequest> {
        let mut requests = Vec::new();
        if let Some(info) = reply.message_info.as_deref() {
            self.state.status = Some(StatusLine::info(info));
        }

        match self.hosting_toggle(page, &op) {
            Some(toggle) => {
                toggle.succeeded(&op, reply);
                requests.extend(self.page_fetches(true));
            }
            None => warn!("{:?} completed after its page was left", op.action),
        }

        self.state.dashboard.request_refresh();
        let location = self.state.navigator.current().clone();
        requests.extend(self.dashboard_fetches(&location));
        requests
    }

    pub fn on_membership_failed(
        &mut self,
        page: u64,
        op: MembershipOp,
        failure: Failure,
    ) -> Vec<NetworkRequest> {
        if let Some(toggle) = self.hosting_toggle(page, &op) {
            toggle.failed(failure.message.clone());
        }
        if failure.not_found {
            return self.navigate(NOT_FOUND);
        }
        self.state.status = Some(StatusLine::error(failure.message));
        Vec::new()
    }

    fn hosting_toggle(
        &mut self,
        page: u64,
        op: &MembershipOp,
    ) -> Option<&mut MembershipToggle> {
        if page != self.state.page_generation {
            return None;
        }
        self.state.page.toggle_for(op.collective)
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub fn logout(&mut self) -> Vec<NetworkRequest> {
        let delete_google_cookie = self.session.provider() == Some(Provider::Google);
        self.session.teardown();
        self.state.status = Some(StatusLine::info("Signed out"));
        self.end_session(delete_google_cookie)
    }

    fn end_session(&mut self, delete_google_cookie: bool) -> Vec<NetworkRequest> {
        self.state.dashboard.reset();
        self.state.navigator.clear_history();
        let mut requests = vec![NetworkRequest::SignOut { delete_google_cookie }];
        requests.extend(self.navigate(WELCOME));
        requests
    }

    // -----------------------------------------------------------------------
    // Index pages
    // -----------------------------------------------------------------------

    pub fn index_down(&mut self) {
        let len = self.index_len();
        match &mut self.state.page {
            Page::Teams(index) | Page::Tournaments(index) => index.select_next(len),
            Page::Tournament(page) => page.select_next(),
            Page::Activities(page) => page.select_next(),
            _ => {}
        }
    }

    pub fn index_up(&mut self) {
        match &mut self.state.page {
            Page::Teams(index) | Page::Tournaments(index) => index.select_prev(),
            Page::Tournament(page) => page.select_prev(),
            Page::Activities(page) => page.select_prev(),
            _ => {}
        }
    }

    pub fn open_selected(&mut self) -> Vec<NetworkRequest> {
        let view = &self.state.dashboard.view;
        let url = match &self.state.page {
            Page::Teams(index) => view
                .teams
                .as_ref()
                .and_then(|teams| teams.get(index.selected))
                .map(|team| format!("/teams/{}", team.id)),
            Page::Tournaments(index) => view
                .tournaments
                .as_ref()
                .and_then(|tournaments| tournaments.get(index.selected))
                .map(|tournament| format!("/tournaments/{}", tournament.id)),
            _ => None,
        };
        match url {
            Some(url) => self.navigate(&url),
            None => Vec::new(),
        }
    }

    fn index_len(&self) -> usize {
        let view = &self.state.dashboard.view;
        match self.state.page {
            Page::Teams(_) => view.teams.as_ref().map_or(0, Vec::len),
            Page::Tournaments(_) => view.tournaments.as_ref().map_or(0, Vec::len),
            _ => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Location bar
    // -----------------------------------------------------------------------

    pub fn open_location_bar(&mut self) {
        self.state.location_input = Some(self.state.navigator.current().url.clone());
    }

    pub fn location_input(&mut self, c: char) {
        if let Some(input) = self.state.location_input.as_mut() {
            input.push(c);
        }
    }

    pub fn location_backspace(&mut self) {
        if let Some(input) = self.state.location_input.as_mut() {
            input.pop();
        }
    }

    pub fn cancel_location_bar(&mut self) {
        self.state.location_input = None;
    }

    pub fn submit_location_bar(&mut self) -> Vec<NetworkRequest> {
        match self.state.location_input.take() {
            Some(url) if !url.trim().is_empty() => self.navigate(&url),
            Some(_) => self.navigate(ROOT),
            None => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Panels
    // -----------------------------------------------------------------------

    pub fn toggle_help(&mut self) {
        self.state.show_help = !self.state.show_help;
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn toggle_rank_by(&mut self) {
        self.state.dashboard.toggle_rank_by();
    }
}
