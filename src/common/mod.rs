pub mod account;

pub use account::{AccountData, AccountInfo};

pub type Balance = u128;
pub type Index = u32;
pub type RefCount = u32;
