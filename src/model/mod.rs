pub mod api;
pub mod db;
pub mod mongodb;
pub mod projection;
pub mod standings;
