pub mod ernie45;

pub use ernie45::Ernie45Parser;
