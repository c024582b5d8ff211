// Adapters layer: concrete implementations of the domain ports (remote store, clocks).

pub mod clock;
pub mod memory;
pub mod supabase;
