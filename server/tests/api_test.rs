use rocket::{
    http::{Header, Status},
    local::blocking::Client,
};
use tictactoe_common::models::CreateResponse;
use tictactoe_server::rate_limit::games_per_minute;

fn client() -> Client {
    let rocket = tictactoe_server::build().expect("valid cors configuration");
    Client::tracked(rocket).expect("valid rocket instance")
}

fn create_from(client: &Client, ip: &'static str) -> Status {
    client
        .post("/create")
        .header(Header::new("X-Forwarded-For", ip))
        .dispatch()
        .status()
}

#[test]
fn create_returns_game_id() {
    let client = client();
    let response = client
        .post("/create")
        .header(Header::new("X-Forwarded-For", "192.0.2.1"))
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body: CreateResponse = response.into_json().expect("json body");
    assert!(body.id.len() >= 5);
}

#[test]
fn create_ids_are_unique() {
    let client = client();
    let ids: Vec<String> = (0..games_per_minute().min(5))
        .map(|_| {
            client
                .post("/create")
                .header(Header::new("X-Forwarded-For", "192.0.2.2"))
                .dispatch()
                .into_json::<CreateResponse>()
                .expect("json body")
                .id
        })
        .collect();

    for (i, id) in ids.iter().enumerate() {
        assert!(!ids[i + 1..].contains(id));
    }
}

#[test]
fn create_is_rate_limited_per_client() {
    let client = client();
    for _ in 0..games_per_minute() {
        assert_eq!(create_from(&client, "192.0.2.3"), Status::Ok);
    }
    assert_eq!(create_from(&client, "192.0.2.3"), Status::TooManyRequests);
    assert_eq!(create_from(&client, "192.0.2.4"), Status::Ok);
}

#[test]
fn websocket_for_unknown_game_is_not_found() {
    let client = client();
    let response = client
        .get("/ws?id=nope")
        .header(Header::new("Connection", "Upgrade"))
        .header(Header::new("Upgrade", "websocket"))
        .header(Header::new("Sec-WebSocket-Version", "13"))
        .header(Header::new("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ=="))
        .dispatch();

    assert_eq!(response.status(), Status::NotFound);
}
