pub mod headless;

pub use headless::{launch_browser, remove_profile_dir, ChromeLauncher};
