pub mod catalog;
pub mod health;
pub mod metrics;
pub mod publish;
pub mod sales;
