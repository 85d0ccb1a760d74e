pub mod cart;
pub mod health;
pub mod metrics;

pub use cart::*;
pub use health::*;
pub use metrics::*;
