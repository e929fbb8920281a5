pub mod admin;
pub mod audit;
pub mod auth;
pub mod council;
pub mod export;
pub mod message;
pub mod notification;
pub mod professor;
pub mod project;
pub mod score;
