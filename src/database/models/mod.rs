pub mod lottery;
pub mod participant;

pub use lottery::*;
pub use participant::*;
