use rocket::Route;

mod admin;
mod auth;
mod common;
mod public;
mod voter;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(voting::routes());
    routes.extend(voter::routes());
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes
}
