pub mod account_api;
