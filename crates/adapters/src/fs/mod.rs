mod loader;
mod scanner;

pub use loader::{read_load_command, BackgroundImageLoader, LoadRequest, LoadedFile};
pub use scanner::{CandidateFile, WalkdirImageScanner};
