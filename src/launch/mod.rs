mod machine;

pub use machine::{LaunchMachine, LaunchState};
