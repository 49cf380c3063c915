//! VoltGuard energy dashboard core.
//!
//! # Crate Structure
//!
//! - [`streak`]: Streak tier classification, tier profiles and weekly usage
//! - [`wire`]: Frame-feed wire protocol and codec
//! - [`feed`]: Pull-based camera frame feed client

/// Re-export streak types.
pub mod streak {
    pub use voltguard_streak::*;
}

/// Re-export wire types.
pub mod wire {
    pub use voltguard_wire::*;
}

/// Re-export feed client types.
pub mod feed {
    pub use voltguard_feed::*;
}
