mod life_situation;
mod organization;
mod process;
mod service;

pub use life_situation::*;
pub use organization::*;
pub use process::*;
pub use service::*;
