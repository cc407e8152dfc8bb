pub mod charts;
pub mod error;
pub mod health;
pub mod home;
pub mod map;
pub mod navigation;
pub mod openapi;
pub mod records;
pub mod views;

use actix_web::web;

/// Mount every endpoint
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(error::configure)
        .configure(health::configure)
        .configure(home::configure)
        .configure(navigation::configure)
        .configure(records::configure)
        .configure(views::configure)
        .configure(charts::configure)
        .configure(map::configure)
        .configure(openapi::configure);
}
