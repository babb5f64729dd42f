//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate requests into calls on the driving ports held by
//! [`state::HttpState`] and render domain values through the DTO modules.

pub mod auth;
pub mod error;
pub mod health;
pub mod ingredients;
mod pages;
pub mod recipes;
pub mod recipes_dto;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod users_dto;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api` route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure)
        .configure(ingredients::configure)
        .configure(recipes::configure)
        .configure(users::configure);
}
