//! Background [`Task`]s definitions.

mod background;
pub mod listen;

pub use common::Handler as Task;

pub use self::{background::Background, listen::Listen};
