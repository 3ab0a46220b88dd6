mod address;

pub use address::{Address, ADDRESS_SIZE};
