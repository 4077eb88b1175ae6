//! V1 API handlers.

mod lists;
mod prompts;
mod system;
mod tags;
mod tasks;


pub use lists::*;
pub use prompts::*;
pub use system::*;
pub use tags::*;
pub use tasks::*;
