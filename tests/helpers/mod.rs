pub mod database;
pub mod ledger;
