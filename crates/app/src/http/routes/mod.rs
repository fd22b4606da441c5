pub mod auth;
pub mod comments;
pub mod health;
pub mod likes;
pub mod password_reset;
pub mod posts;
pub mod profile;
pub mod uploads;
