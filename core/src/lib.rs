pub use analysis::*;
pub use board::*;
pub use editor::*;
pub use error::*;
pub use mark::*;
pub use types::*;
pub use variant::*;

mod analysis;
mod board;
mod editor;
mod error;
mod mark;
mod types;
mod variant;
