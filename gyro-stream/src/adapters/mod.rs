pub(crate) mod scripted;
pub(crate) mod synthetic;

pub use scripted::ScriptedGyro;
pub use synthetic::SyntheticGyro;
