pub mod exit;
pub mod game;
pub mod login;
pub mod scene;
