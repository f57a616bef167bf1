pub mod defaults;
pub mod resolve;
