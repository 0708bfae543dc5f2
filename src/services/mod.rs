pub mod ledger;
pub mod storage;
pub mod tenants;
