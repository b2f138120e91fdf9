// Host commands module.
// Each command gets its own file.

pub mod crown;
