use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::error::GameError;
use crate::models::messages::{
    CreatedGame, Credentials, LoginResponse, MoveRequest, OpenGame, PlayerTokenRequest,
    StatusMessage,
};
use crate::models::AppState;

type HandlerResult = Result<HttpResponse, GameError>;

/// POST /api/register
async fn register(state: web::Data<AppState>, body: web::Json<Credentials>) -> HandlerResult {
    let account = state.games.register(&body.username, &body.password).await?;
    Ok(HttpResponse::Created().json(account))
}

/// POST /api/login
async fn login(state: web::Data<AppState>, body: web::Json<Credentials>) -> HandlerResult {
    let (token, user_id) = state.games.login(&body.username, &body.password).await?;
    Ok(HttpResponse::Ok().json(LoginResponse { token, user_id }))
}

/// POST /api/logout, authenticated with a bearer token
async fn logout(state: web::Data<AppState>, req: HttpRequest) -> HandlerResult {
    state.games.logout(bearer_token(&req)?).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::new("Logged out")))
}

/// GET /api/me, authenticated with a bearer token
async fn me(state: web::Data<AppState>, req: HttpRequest) -> HandlerResult {
    let user_id = state.games.authenticate(bearer_token(&req)?).await?;
    let account = state.games.account(user_id).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// POST /api/games
async fn create_game(state: web::Data<AppState>, body: web::Json<PlayerTokenRequest>) -> HandlerResult {
    let user_id = state.games.authenticate(&body.player_token).await?;
    let id = state.games.create_game(user_id).await?;
    Ok(HttpResponse::Ok().json(CreatedGame { id }))
}

/// GET /api/games
async fn list_games(state: web::Data<AppState>) -> HandlerResult {
    let games: Vec<OpenGame> = state
        .games
        .open_games()
        .await?
        .into_iter()
        .map(OpenGame::from)
        .collect();
    Ok(HttpResponse::Ok().json(games))
}

/// POST /api/games/{id}/join
async fn join_game(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerTokenRequest>,
) -> HandlerResult {
    let user_id = state.games.authenticate(&body.player_token).await?;
    state.games.join_game(path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::new("Joined game successfully")))
}

/// POST /api/games/move
async fn submit_move(state: web::Data<AppState>, body: web::Json<MoveRequest>) -> HandlerResult {
    let user_id = state.games.authenticate(&body.user).await?;
    let mv = body.to_move()?;
    state.games.submit_move(body.session, user_id, mv).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::new("Move submitted successfully")))
}

/// POST /api/games/{id}/offer-draw
async fn offer_draw(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerTokenRequest>,
) -> HandlerResult {
    let user_id = state.games.authenticate(&body.player_token).await?;
    state.games.offer_draw(path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::new("Draw offer sent")))
}

/// POST /api/games/{id}/accept-draw
async fn accept_draw(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerTokenRequest>,
) -> HandlerResult {
    let user_id = state.games.authenticate(&body.player_token).await?;
    state.games.accept_draw(path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::new("Draw accepted, game ended")))
}

/// POST /api/games/{id}/decline-draw
async fn decline_draw(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerTokenRequest>,
) -> HandlerResult {
    let user_id = state.games.authenticate(&body.player_token).await?;
    state.games.decline_draw(path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(StatusMessage::new("Draw offer declined")))
}

/// POST /api/games/{id}/resign
async fn resign(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerTokenRequest>,
) -> HandlerResult {
    let user_id = state.games.authenticate(&body.player_token).await?;
    let winner = state.games.resign(path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(StatusMessage {
        message: "Resigned successfully".to_string(),
        winner: Some(winner),
    }))
}

/// GET /api/games/{id}/board, authenticated with a bearer token
async fn poll_board(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> HandlerResult {
    let game_id = path.into_inner();
    let user_id = state.games.authenticate(bearer_token(&req)?).await?;
    state.games.player_color(game_id, user_id).await?;
    let poll = state.games.poll_board(game_id).await?;
    Ok(HttpResponse::Ok().json(poll))
}

fn bearer_token(req: &HttpRequest) -> Result<&str, GameError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(GameError::Unauthenticated)
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| GameError::BadRequest(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|_, _| GameError::GameNotFound.into()))
    .route("/api/register", web::post().to(register))
    .route("/api/login", web::post().to(login))
    .route("/api/logout", web::post().to(logout))
    .route("/api/me", web::get().to(me))
    .service(
        web::scope("/api/games")
            .route("", web::post().to(create_game))
            .route("", web::get().to(list_games))
            .route("/move", web::post().to(submit_move))
            .route("/{id}/join", web::post().to(join_game))
            .route("/{id}/offer-draw", web::post().to(offer_draw))
            .route("/{id}/accept-draw", web::post().to(accept_draw))
            .route("/{id}/decline-draw", web::post().to(decline_draw))
            .route("/{id}/resign", web::post().to(resign))
            .route("/{id}/board", web::get().to(poll_board)),
    );
}
