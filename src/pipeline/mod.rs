pub mod builder;
pub mod defaults;
pub mod runtime;
pub mod service;
pub mod traits;
