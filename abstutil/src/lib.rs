mod abst_multimap;
mod collections;
mod tags;
mod time;

pub use crate::abst_multimap::MultiMap;
pub use crate::collections::retain_btreemap;
pub use crate::tags::Tags;
pub use crate::time::{elapsed_seconds, prettyprint_time, prettyprint_usize, Timer};
