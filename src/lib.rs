pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod source;
pub mod tasks {
    pub mod rotator;
}
pub mod web;
