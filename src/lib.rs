//! Vendora API Library
//!
//! This crate provides the core functionality for the Vendora
//! e-commerce administration backend: product catalog, user directory,
//! and promotional hero video management.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;

use crate::clients::{IdentityProviderClient, MediaStorageClient};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub identity: Arc<IdentityProviderClient>,
    pub media: Arc<MediaStorageClient>,
}

/// The `/api` routing table: catalog, user directory, hero videos, health.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::products_routes(state.clone()))
        .nest("/users", handlers::users::users_routes(state.clone()))
        .nest(
            "/hero-videos",
            handlers::hero_videos::hero_videos_routes(state),
        )
        .route("/health", get(handlers::health::health_check))
}
