//! # Audio Module
//!
//! Per-guild playback queue engine.
//!
//! The engine is split into data and control:
//!
//! ### [`track`] / [`queue`] - Queue state
//! - Ordered, capacity-bounded track queue with an explicit length counter
//! - Loop flag, head-pinned shuffle, idle (pause/skip) timestamping
//! - Pure state, mutated only inside the owning player's critical section
//!
//! ### [`sink`] - Voice output capability
//! - One active stream per guild, owned by the sink while it plays
//! - Completion delivered exactly once per attempt over an mpsc channel
//!
//! ### [`player`] - Per-guild control
//! - Serializes every mutating operation behind one async mutex
//! - Drives playback, reacts to completions, bounded failure recovery
//!
//! ### [`manager`] - Registry
//! - One player per guild voice session, torn down on disconnect
//! - Background reaper for stale (long-idle) sessions

pub mod manager;
pub mod player;
pub mod queue;
pub mod sink;
pub mod track;
