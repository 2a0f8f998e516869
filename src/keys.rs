use crate::app::App;
use crate::state::app_state::PageKind;
use crate::state::messages::NetworkRequest;
use crate::state::navigation::ACTIVITIES;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let requests = dispatch(key_event, &mut guard);
    drop(guard);

    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

fn dispatch(key_event: KeyEvent, app: &mut App) -> Vec<NetworkRequest> {
    let (code, modifiers) = (key_event.code, key_event.modifiers);

    if let (Char('c'), KeyModifiers::CONTROL) = (code, modifiers) {
        quit();
    }

    if app.state.location_input.is_some() {
        match code {
            KeyCode::Enter => return app.submit_location_bar(),
            KeyCode::Esc => app.cancel_location_bar(),
            KeyCode::Backspace => app.location_backspace(),
            Char(c) => app.location_input(c),
            _ => {}
        }
        return Vec::new();
    }

    if app.state.confirm_leave.is_some() {
        return match code {
            Char('y') | Char('Y') => app.answer_leave(true),
            _ => app.answer_leave(false),
        };
    }

    if app.state.show_help {
        match code {
            Char('q') => quit(),
            Char('?') | KeyCode::Esc => app.toggle_help(),
            _ => {}
        }
        return Vec::new();
    }

    match (app.state.page.kind(), code) {
        (_, Char('q')) => quit(),

        // Panels
        (_, Char('?')) => app.toggle_help(),
        (_, Char('"')) => app.toggle_show_logs(),
        (_, Char('f')) => app.toggle_full_screen(),
        (_, Char('r')) => app.toggle_rank_by(),

        // Navigation
        (_, Char('g')) => return app.navigate("/"),
        (_, Char('t')) => return app.navigate("/teams"),
        (_, Char('T')) => return app.navigate("/tournaments"),
        (_, Char('a')) => return app.navigate(ACTIVITIES),
        (_, Char('R')) => return app.refresh(),
        (_, KeyCode::Backspace) => return app.back(),
        (_, Char('/')) => app.open_location_bar(),
        (_, Char('L')) => return app.logout(),

        // Lists and buttons
        (PageKind::Teams | PageKind::Tournaments, KeyCode::Enter) => return app.open_selected(),
        (PageKind::Activities, Char('m') | KeyCode::Enter) => return app.more_activities(),
        (PageKind::Tournament, KeyCode::Tab) => app.index_down(),
        (PageKind::Tournament, KeyCode::BackTab) => app.index_up(),
        (_, Char('j') | KeyCode::Down) => app.index_down(),
        (_, Char('k') | KeyCode::Up) => app.index_up(),
        (PageKind::Team | PageKind::Tournament, Char('J') | KeyCode::Enter) => {
            return app.toggle_membership();
        }

        _ => {}
    }
    Vec::new()
}

fn quit() {
    crate::cleanup_terminal();
    std::process::exit(0);
}
