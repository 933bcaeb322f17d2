pub mod backup;
pub mod chart;
pub mod exchange;
pub mod holding;
pub mod ledger;
pub mod settings;
