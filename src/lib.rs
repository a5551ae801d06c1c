//! REST API for managing contacts and their avatar images.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use storage::{AvatarStore, ContactRepository};

pub use api::build_app;

#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<dyn ContactRepository>,
    pub avatars: AvatarStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(contacts: Arc<dyn ContactRepository>, config: Config) -> Self {
        Self {
            contacts,
            avatars: AvatarStore::new(&config.upload),
            config: Arc::new(config),
        }
    }
}
