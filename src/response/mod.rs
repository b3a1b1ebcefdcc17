pub mod common;
pub mod scroll;

pub use common::{Hit, HitsTotal, HitsWrapper, Shards};
pub use scroll::ScrollResponse;
