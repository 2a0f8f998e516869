use crate::state::messages::{Fetch, NetworkRequest, NetworkResponse, Origin, Payload};
use gonawin_api::client::{ACTIVITIES_PER_PAGE, ApiResult, GonawinApi, RANKING_LIMIT};
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs every request as its own task so independent fetches land in any order.
pub struct NetworkWorker {
    client: GonawinApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    spinner: Spinner,
}

impl NetworkWorker {
    pub fn new(
        client: GonawinApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            spinner: Spinner { in_flight: Arc::new(AtomicUsize::new(0)), responses: responses.clone() },
            requests,
            responses,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                NetworkRequest::SignOut { delete_google_cookie } => {
                    // Handled inline so later requests already go out without credentials.
                    if delete_google_cookie
                        && let Err(e) = self.client.delete_google_cookie().await
                    {
                        warn!("failed to delete google cookie: {e}");
                    }
                    self.client.set_auth(None);
                }
                NetworkRequest::Fetch { origin, fetch } => {
                    let client = self.client.clone();
                    let responses = self.responses.clone();
                    let spinner = self.spinner.clone();
                    tokio::spawn(async move {
                        spinner.begin().await;
                        debug!("fetching {fetch:?} for {origin:?}");
                        let response = match load(&client, fetch).await {
                            Ok(payload) => NetworkResponse::Loaded { origin, payload },
                            Err(err) => {
                                error!("fetch for {origin:?} failed: {err}");
                                NetworkResponse::Failed { origin, failure: err.into() }
                            }
                        };
                        spinner.end(matches!(response, NetworkResponse::Loaded { .. })).await;
                        send(&responses, response).await;
                    });
                }
                NetworkRequest::Membership { page, op } => {
                    let client = self.client.clone();
                    let responses = self.responses.clone();
                    let spinner = self.spinner.clone();
                    tokio::spawn(async move {
                        spinner.begin().await;
                        debug!("applying {op:?}");
                        let response = match client.apply_membership(&op).await {
                            Ok(reply) => NetworkResponse::MembershipApplied { page, op, reply },
                            Err(err) => {
                                error!("{:?} failed: {err}", op.action);
                                NetworkResponse::MembershipFailed { page, op, failure: err.into() }
                            }
                        };
                        spinner
                            .end(matches!(response, NetworkResponse::MembershipApplied { .. }))
                            .await;
                        send(&responses, response).await;
                    });
                }
            }
        }
        debug!("network worker stopped");
    }
}

async fn load(client: &GonawinApi, fetch: Fetch) -> ApiResult<Payload> {
    let payload = match fetch {
        Fetch::CurrentUser { user_id } => Payload::CurrentUser(client.fetch_user(user_id).await?),
        Fetch::UserTeams { user_id } => Payload::UserTeams(client.fetch_user_teams(user_id).await?),
        Fetch::UserTournaments { user_id } => {
            Payload::UserTournaments(client.fetch_user_tournaments(user_id).await?)
        }
        Fetch::Team { id } => Payload::Team(client.fetch_team(id).await?),
        Fetch::TeamRanking { id } => {
            Payload::TeamRanking(client.fetch_team_ranking(id, RANKING_LIMIT).await?)
        }
        Fetch::Tournament { id } => Payload::Tournament(client.fetch_tournament(id).await?),
        Fetch::TournamentRanking { id, rank_by } => Payload::TournamentRanking {
            rank_by,
            ranked: client.fetch_tournament_ranking(id, rank_by, RANKING_LIMIT).await?,
        },
        Fetch::Candidates { id } => Payload::Candidates(client.fetch_candidates(id).await?),
        Fetch::Activities { page } => {
            Payload::Activities(client.fetch_activities(ACTIVITIES_PER_PAGE, page).await?)
        }
    };
    Ok(payload)
}

async fn send(responses: &mpsc::Sender<NetworkResponse>, response: NetworkResponse) {
    if let Err(e) = responses.send(response).await {
        error!("Failed to send network response: {e}");
    }
}

/// Loading indicator shared by all in-flight requests. It spins while at
/// least one request is outstanding.
#[derive(Clone)]
struct Spinner {
    in_flight: Arc<AtomicUsize>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl Spinner {
    async fn begin(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            return;
        }

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn end(&self, is_ok: bool) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
