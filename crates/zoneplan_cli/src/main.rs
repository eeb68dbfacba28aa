//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `zoneplan_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("zoneplan_core ping={}", zoneplan_core::ping());
    println!("zoneplan_core version={}", zoneplan_core::core_version());
}
