mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use online_chess_api::{configure_routes, AppState, Config, MemoryStore};

struct Players {
    white: String,
    black: String,
    stranger: String,
}

fn seeded_store() -> (Arc<MemoryStore>, Players) {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let players = Players {
        white: store.issue_token(common::WHITE),
        black: store.issue_token(common::BLACK),
        stranger: store.issue_token(common::STRANGER),
    };
    (store, players)
}

macro_rules! chess_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($store, &Config::default())))
                .configure(configure_routes),
        )
        .await
    };
}

fn move_body(game: &str, token: &str, piece: &str, from: (i64, i64), to: (i64, i64)) -> Value {
    json!({
        "session": game,
        "user": token,
        "piece": piece,
        "from": {"row": from.0, "col": from.1},
        "to": {"row": to.0, "col": to.1},
    })
}

#[actix_rt::test]
async fn create_join_move_and_poll() {
    let (store, players) = seeded_store();
    let app = chess_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({"player_token": players.white}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game = created["id"].as_str().expect("game id").to_string();

    let req = test::TestRequest::get().uri("/api/games").to_request();
    let open: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(open[0]["id"], game.as_str());
    assert_eq!(open[0]["player_white"], common::WHITE);
    assert_eq!(open[0]["player_black"], Value::Null);

    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/join"))
        .set_json(json!({"player_token": players.black}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{game}/board"))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", players.black)))
        .to_request();
    let before: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(before, json!({"number": 0, "notation": ""}));

    let req = test::TestRequest::post()
        .uri("/api/games/move")
        .set_json(move_body(&game, &players.white, "white-pawn", (6, 4), (4, 4)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{game}/board"))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", players.black)))
        .to_request();
    let after: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(after, json!({"number": 1, "notation": "white-pawn e2->e4"}));

    // Games in progress stay listed with both seats filled.
    let req = test::TestRequest::get().uri("/api/games").to_request();
    let open: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(open[0]["player_black"], common::BLACK);
}

#[actix_rt::test]
async fn move_rejections_carry_status_and_code() {
    let (store, players) = seeded_store();
    let app = chess_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({"player_token": players.white}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game = created["id"].as_str().expect("game id").to_string();

    // Waiting for an opponent.
    let req = test::TestRequest::post()
        .uri("/api/games/move")
        .set_json(move_body(&game, &players.white, "white-pawn", (6, 4), (4, 4)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "GAME_NOT_ACTIVE");

    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/join"))
        .set_json(json!({"player_token": players.black}))
        .to_request();
    test::call_service(&app, req).await;

    let cases = [
        (
            move_body(&game, &players.black, "black-pawn", (1, 4), (3, 4)),
            StatusCode::FORBIDDEN,
            "NOT_YOUR_TURN",
        ),
        (
            move_body(&game, &players.white, "white-rook", (7, 0), (5, 0)),
            StatusCode::BAD_REQUEST,
            "BLOCKED_PATH",
        ),
        (
            move_body(&game, &players.white, "white-knight", (7, 1), (6, 3)),
            StatusCode::BAD_REQUEST,
            "OCCUPIED_BY_FRIENDLY",
        ),
        (
            move_body(&game, &players.white, "white-bishop", (7, 2), (5, 2)),
            StatusCode::BAD_REQUEST,
            "OUT_OF_SHAPE_FOR_PIECE",
        ),
        (
            move_body(&game, &players.white, "white-wizard", (7, 2), (5, 2)),
            StatusCode::BAD_REQUEST,
            "UNKNOWN_PIECE_KIND",
        ),
        (
            move_body(&game, &players.white, "white-pawn", (6, 4), (9, 4)),
            StatusCode::BAD_REQUEST,
            "OFF_BOARD",
        ),
        (
            move_body(&game, &players.stranger, "white-pawn", (6, 4), (4, 4)),
            StatusCode::FORBIDDEN,
            "NOT_A_PARTICIPANT",
        ),
        (
            move_body(&game, "forged-token", "white-pawn", (6, 4), (4, 4)),
            StatusCode::UNAUTHORIZED,
            "UNAUTHENTICATED",
        ),
        (
            move_body(
                &Uuid::new_v4().to_string(),
                &players.white,
                "white-pawn",
                (6, 4),
                (4, 4),
            ),
            StatusCode::NOT_FOUND,
            "GAME_NOT_FOUND",
        ),
    ];

    for (body, status, code) in cases {
        let req = test::TestRequest::post()
            .uri("/api/games/move")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{body}");
        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["code"], code, "{body}");
    }
}

#[actix_rt::test]
async fn draw_offer_shows_in_poll_and_resign_names_winner() {
    let (store, players) = seeded_store();
    let app = chess_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({"player_token": players.white}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game = created["id"].as_str().expect("game id").to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/join"))
        .set_json(json!({"player_token": players.black}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/offer-draw"))
        .set_json(json!({"player_token": players.white}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{game}/board"))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", players.white)))
        .to_request();
    let poll: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(poll["draw_offer"], "white");

    // The offeror cannot accept their own offer.
    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/accept-draw"))
        .set_json(json!({"player_token": players.white}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "NO_DRAW_OFFER");

    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/decline-draw"))
        .set_json(json!({"player_token": players.black}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/games/{game}/resign"))
        .set_json(json!({"player_token": players.black}))
        .to_request();
    let resigned: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resigned["winner"], "white");

    let req = test::TestRequest::post()
        .uri("/api/games/move")
        .set_json(move_body(&game, &players.white, "white-pawn", (6, 4), (4, 4)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "GAME_FINISHED");
}

#[actix_rt::test]
async fn malformed_requests_are_rejected_up_front() {
    let (store, players) = seeded_store();
    let app = chess_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/games/move")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"session\": 42")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "BAD_REQUEST");

    let req = test::TestRequest::post()
        .uri("/api/games/not-a-game/join")
        .set_json(json!({"player_token": players.black}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({"player_token": players.white}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let game = created["id"].as_str().expect("game id").to_string();

    // Polling needs a bearer token.
    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{game}/board"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{game}/board"))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", players.stranger)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn register_login_me_and_logout() {
    let (store, _) = seeded_store();
    let app = chess_app!(store);
    let credentials = json!({"username": "alice", "password": "s3cret"});

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let account: Value = test::read_body_json(resp).await;
    assert_eq!(account["username"], "alice");

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "USERNAME_TAKEN");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"username": "alice", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&credentials)
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(login["user_id"], account["id"]);
    let token = login["token"].as_str().expect("token").to_string();
    let bearer = format!("Bearer {token}");

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((header::AUTHORIZATION, bearer.as_str()))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me, account);

    // The fresh token works on the game routes.
    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({"player_token": token}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/logout")
        .insert_header((header::AUTHORIZATION, bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((header::AUTHORIZATION, bearer.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "UNAUTHENTICATED");
}
