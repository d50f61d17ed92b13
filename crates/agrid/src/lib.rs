//! agrid library - HTTP daemon for the AgriDetect knowledge service.
//!
//! Exposes the catalog, reconciler, chat resolver and detection reports
//! over JSON.

pub mod classifier;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod sessions;

pub use classifier::{Classifier, ClassifierError, FixedClassifier};
pub use config::Config;
pub use error::ApiError;
pub use server::{router, AppState};
pub use sessions::SessionStore;
