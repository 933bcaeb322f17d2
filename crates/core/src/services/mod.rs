pub mod chart_service;
pub mod ledger_service;
pub mod order_service;
pub mod quote_service;
pub mod valuation_service;
