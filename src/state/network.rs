use crate::routes::RouteToken;
use crate::state::messages::{FriendAction, NetworkRequest, NetworkResponse};
use ggforge_api::client::{GgForgeApi, MapCompletion};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
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

/// Runs backend calls one at a time, in the order they were requested.
pub struct NetworkWorker {
    client: GgForgeApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: GgForgeApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let response = match request {
                NetworkRequest::LoadTeam { token, team_id } => {
                    self.handle_load_team(token, team_id).await
                }
                NetworkRequest::StartMatch { token, tournament_id, match_id } => {
                    self.handle_start_match(token, tournament_id, match_id).await
                }
                NetworkRequest::CompleteMatch { token, tournament_id, match_id, completions } => {
                    self.handle_complete_match(token, tournament_id, match_id, completions)
                        .await
                }
                NetworkRequest::Friendship { token, user_id, action } => {
                    self.handle_friendship(token, user_id, action).await
                }
                NetworkRequest::Registration {
                    token,
                    tournament_id,
                    is_team,
                    participant_id,
                    register,
                } => {
                    self.handle_registration(token, tournament_id, is_team, participant_id, register)
                        .await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(response_ok(&response)).await;

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_team(&self, token: RouteToken, team_id: String) -> NetworkResponse {
        debug!("loading team {team_id}");
        let result = self.client.fetch_team(&team_id).await.map_err(|e| {
            error!("Failed to load team {team_id}: {e}");
            e.to_string()
        });
        NetworkResponse::TeamLoaded { token, team_id, result }
    }

    async fn handle_start_match(
        &self,
        token: RouteToken,
        tournament_id: String,
        match_id: String,
    ) -> NetworkResponse {
        let result = self
            .client
            .start_match(&tournament_id, &match_id)
            .await
            .map_err(|e| {
                error!("Failed to start match {match_id}: {e}");
                e.to_string()
            });
        if result.is_ok() {
            info!("match {match_id} started");
        }
        NetworkResponse::MatchStarted { token, match_id, result }
    }

    async fn handle_complete_match(
        &self,
        token: RouteToken,
        tournament_id: String,
        match_id: String,
        completions: Vec<MapCompletion>,
    ) -> NetworkResponse {
        debug!("completing {} maps of match {match_id}", completions.len());
        let result = self
            .client
            .complete_maps(&tournament_id, &match_id, &completions)
            .await
            .map_err(|e| {
                error!("Failed to finish match {match_id}: {e}");
                e.to_string()
            });
        if result.is_ok() {
            info!("match {match_id} finished");
        }
        NetworkResponse::MatchCompleted { token, match_id, result }
    }

    async fn handle_friendship(
        &self,
        token: RouteToken,
        user_id: String,
        action: FriendAction,
    ) -> NetworkResponse {
        let result = match action {
            FriendAction::SendRequest => self.client.send_friend_request(&user_id).await,
            FriendAction::CancelRequest => self.client.cancel_friend_request(&user_id).await,
            FriendAction::Remove => self.client.remove_friend(&user_id).await,
        }
        .map_err(|e| {
            error!("Friend action {action:?} for {user_id} failed: {e}");
            e.to_string()
        });
        NetworkResponse::FriendshipUpdated { token, user_id, action, result }
    }

    async fn handle_registration(
        &self,
        token: RouteToken,
        tournament_id: String,
        is_team: bool,
        participant_id: String,
        register: bool,
    ) -> NetworkResponse {
        let result = if register {
            self.client
                .register_for_tournament(&tournament_id, is_team, &participant_id)
                .await
        } else {
            self.client
                .unregister_from_tournament(&tournament_id, is_team, &participant_id)
                .await
        }
        .map_err(|e| {
            error!("Registration change for tournament {tournament_id} failed: {e}");
            e.to_string()
        });
        NetworkResponse::RegistrationUpdated {
            token,
            tournament_id,
            is_team,
            participant_id,
            register,
            result,
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
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

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
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

fn response_ok(response: &NetworkResponse) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { .. } => true,
        NetworkResponse::TeamLoaded { result, .. } => result.is_ok(),
        NetworkResponse::MatchStarted { result, .. }
        | NetworkResponse::MatchCompleted { result, .. }
        | NetworkResponse::FriendshipUpdated { result, .. }
        | NetworkResponse::RegistrationUpdated { result, .. } => result.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    async fn run_one(server_url: String, request: NetworkRequest) -> Vec<NetworkResponse> {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(256);
        let worker = NetworkWorker::new(GgForgeApi::new(server_url), req_rx, resp_tx);
        let handle = tokio::spawn(worker.run());
        req_tx.send(request).await.unwrap();
        drop(req_tx);
        handle.await.unwrap();

        let mut out = Vec::new();
        while let Ok(r) = resp_rx.try_recv() {
            if !matches!(r, NetworkResponse::LoadingStateChanged { .. }) {
                out.push(r);
            }
        }
        out
    }

    #[tokio::test]
    async fn failed_start_reports_backend_message_with_token() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/tournaments/t1/matches/m1/start")
            .with_status(400)
            .with_body(r#"{"msg": "Match already started"}"#)
            .create_async()
            .await;

        let responses = run_one(
            server.url(),
            NetworkRequest::StartMatch {
                token: RouteToken(7),
                tournament_id: "t1".into(),
                match_id: "m1".into(),
            },
        )
        .await;

        match responses.as_slice() {
            [NetworkResponse::MatchStarted { token, match_id, result: Err(message) }] => {
                assert_eq!(*token, RouteToken(7));
                assert_eq!(match_id, "m1");
                assert!(message.contains("Match already started"));
            }
            other => panic!("unexpected responses: {other:?}"),
        }
    }

    #[tokio::test]
    async fn team_load_goes_through_client() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/teams/3")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 3, "title": "Iron Wolves", "players": []}"#)
            .create_async()
            .await;

        let responses = run_one(
            server.url(),
            NetworkRequest::LoadTeam { token: RouteToken(1), team_id: "3".into() },
        )
        .await;

        match responses.as_slice() {
            [NetworkResponse::TeamLoaded { result: Ok(team), .. }] => {
                assert_eq!(team.name, "Iron Wolves")
            }
            other => panic!("unexpected responses: {other:?}"),
        }
    }
}
