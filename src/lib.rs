pub mod admin;
pub mod app;
pub mod audit;
pub mod config;
pub mod datetime;
pub mod loading;
pub mod observability;
pub mod registry;
pub mod security;
pub mod validator;

pub use app::{AppError, AppStatus, Application, ApplicationBuilder};
pub use loading::Unit;
