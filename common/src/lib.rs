pub mod config;
pub mod context;
pub mod entities;
pub mod error;
pub mod mail;
pub mod notification;
pub mod repository;
