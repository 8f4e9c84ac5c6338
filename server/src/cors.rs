use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;

fn allowed_origins() -> Vec<String> {
    env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn create_cors() -> Result<rocket_cors::Cors, rocket_cors::Error> {
    CorsOptions {
        allowed_origins: AllowedOrigins::some_exact(&allowed_origins()),
        allowed_methods: vec![Method::Get, Method::Post, Method::Options]
            .into_iter()
            .map(|m| m.into())
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Accept", "Content-Type", "X-Requested-With"]),
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()
}
