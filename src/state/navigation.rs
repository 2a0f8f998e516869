use log::debug;

pub const ROOT: &str = "/";
pub const WELCOME: &str = "/welcome";
pub const SIGN_IN: &str = "/signin";
pub const NOT_FOUND: &str = "/404";
pub const ACTIVITIES: &str = "/activities";

/// Pages the backend knows about but this client only shows the dashboard for.
const PASSIVE_PATHS: [&str; 8] = [
    "/search",
    "/users",
    "/invite",
    "/teams/new",
    "/tournaments/new",
    "/settings/edit-profile",
    "/settings/networks",
    "/settings/email",
];

/// Parameters extracted from a location once navigation has settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub id: Option<i64>,
    pub tab: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path plus query, fragment dropped.
    pub url: String,
    pub path: String,
    pub params: RouteParams,
}

impl Default for Location {
    fn default() -> Self {
        Self::parse(ROOT)
    }
}

impl Location {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let without_fragment = input.split('#').next().unwrap_or_default();
        let (raw_path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        let mut path = String::with_capacity(raw_path.len() + 1);
        if !raw_path.starts_with('/') {
            path.push('/');
        }
        path.push_str(raw_path);

        let url = match query {
            Some(q) if !q.is_empty() => format!("{path}?{q}"),
            _ => path.clone(),
        };

        let params = RouteParams { id: path_id(&path), tab: query.and_then(|q| query_value(q, "tab")) };

        Self { url, path, params }
    }

    pub fn route(&self) -> Route {
        Route::from_path(&self.path)
    }
}

/// Page a location renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Welcome,
    About,
    GettingStarted,
    SignIn,
    NotFound,
    Teams,
    Team(i64),
    Tournaments,
    Tournament(i64),
    Activities,
    Passive,
    Unknown,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => return Route::Home,
            "/welcome" => return Route::Welcome,
            "/about" => return Route::About,
            "/getting-started" => return Route::GettingStarted,
            "/signin" => return Route::SignIn,
            "/404" => return Route::NotFound,
            "/teams" => return Route::Teams,
            "/tournaments" => return Route::Tournaments,
            ACTIVITIES => return Route::Activities,
            _ => {}
        }
        if PASSIVE_PATHS.iter().any(|p| trimmed == *p || trimmed.starts_with(&format!("{p}/"))) {
            return Route::Passive;
        }
        let mut segments = trimmed.trim_start_matches('/').split('/');
        match (segments.next(), segments.next().and_then(numeric_segment)) {
            (Some("teams"), Some(id)) => Route::Team(id),
            (Some("tournaments"), Some(id)) => Route::Tournament(id),
            (Some("users" | "teams" | "tournaments"), _) => Route::Passive,
            _ => Route::Unknown,
        }
    }

    /// Everything but the welcome, about, getting-started, sign-in and
    /// not-found pages needs a session.
    pub fn requires_login(self) -> bool {
        !matches!(
            self,
            Route::Welcome | Route::About | Route::GettingStarted | Route::NotFound | Route::SignIn
        )
    }
}

/// Numeric id in the second segment of `/teams/<id>`, `/tournaments/<id>`
/// or `/users/<id>`.
fn path_id(path: &str) -> Option<i64> {
    let mut segments = path.trim_start_matches('/').split('/');
    match segments.next()? {
        "teams" | "tournaments" | "users" => numeric_segment(segments.next()?),
        _ => None,
    }
}

/// A path segment made of ASCII digits only that fits an `i64`. Signs,
/// suffixes and overflowing numbers are not ids.
pub fn numeric_segment(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

/// Redirect applied on every navigation before the page is entered.
pub fn guard(target: Location, logged_in: bool) -> Location {
    let route = target.route();
    if route == Route::Unknown {
        debug!("no route for {}, redirecting to {ROOT}", target.path);
        return guard(Location::parse(ROOT), logged_in);
    }
    if !logged_in && route.requires_login() {
        debug!("{} requires login, redirecting to {WELCOME}", target.path);
        return Location::parse(WELCOME);
    }
    if logged_in && matches!(route, Route::Welcome | Route::SignIn) {
        return Location::parse(ROOT);
    }
    target
}

/// Current location plus the trail that led to it.
#[derive(Debug, Default)]
pub struct Navigator {
    current: Location,
    history: Vec<Location>,
}

impl Navigator {
    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Navigate to `url`, applying the route guard. Returns the location
    /// actually reached.
    pub fn go(&mut self, url: &str, logged_in: bool) -> &Location {
        let next = guard(Location::parse(url), logged_in);
        if next != self.current {
            let previous = std::mem::replace(&mut self.current, next);
            self.history.push(previous);
        }
        &self.current
    }

    /// Step back through history, skipping entries the guard now rejects.
    pub fn back(&mut self, logged_in: bool) -> Option<&Location> {
        while let Some(previous) = self.history.pop() {
            let allowed = guard(previous.clone(), logged_in);
            if allowed == previous && allowed != self.current {
                self.current = allowed;
                return Some(&self.current);
            }
        }
        None
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
