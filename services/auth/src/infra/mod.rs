pub mod db;
pub mod google;
