//! # Automated Market Maker (AMM) Module
//!
//! Pricing for binary markets uses a **constant-product** curve over two
//! virtual outcome reserves:
//!
//! ```text
//!            k = YES × NO
//!
//!   ┌────────────────────────────────────────┐
//!   │    NO ▲                                │
//!   │       │╲                               │
//!   │       │ ╲                              │
//!   │       │  ╲__     k = constant          │
//!   │       │     ‾‾──___                    │
//!   │       └──────────────────▶ YES         │
//!   │                                         │
//!   │  price(YES) = NO × 10000 / YES (bps)   │
//!   └────────────────────────────────────────┘
//! ```
//!
//! Fees are skimmed from each trade and left inside the reserves, so `k`
//! drifts upward over the life of a market.

pub mod constant_product;

pub use constant_product::*;
