//! waymon-updates — pacman and AUR update monitor for waybar.
//!
//! A readiness-gate consumer: each cycle first waits for the connectivity
//! monitor to confirm working internet, then counts pending updates via
//! `checkupdates` and `pikaur -Qua` and publishes the counts. Hourly
//! cadence, cut short when the daemon forwards a wake signal.

pub mod checker;
pub mod monitor;

pub use checker::{count_aur_updates, count_pacman_updates};
pub use monitor::{UpdatesConfig, UpdatesMonitor};
