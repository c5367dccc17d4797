pub mod backup;
pub mod calendar;
pub mod db;
pub mod ledger;
pub mod models;
pub mod schedule;
pub mod service;
pub mod state;
pub mod store;
