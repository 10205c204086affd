mod account;
pub mod account_number;
mod money;

pub use account::*;
pub use money::*;
