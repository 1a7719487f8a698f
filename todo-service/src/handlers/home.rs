use askama::Template;
use axum::response::IntoResponse;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub version: &'static str,
}

pub async fn home() -> impl IntoResponse {
    HomeTemplate {
        version: env!("CARGO_PKG_VERSION"),
    }
}
