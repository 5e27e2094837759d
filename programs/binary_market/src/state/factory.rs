//! Market Registry
//!
//! The factory owns the market id sequence. A market's address is the PDA
//! derived from its id, so the id → market mapping needs no storage of its
//! own: it is defined for exactly the ids `[0, next_market_id)`.

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::state::Market;

/// Registry account (singleton PDA)
///
/// Seeds: ["factory"]
#[account]
#[derive(InitSpace)]
pub struct Factory {
    /// Id handed to the next market created
    pub next_market_id: u64,

    /// Minimum initial deposit (lamports) for new markets
    pub min_liquidity: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl Factory {
    pub const SEED: &'static [u8] = b"factory";

    /// Address of the registry for this program
    pub fn address() -> Pubkey {
        Pubkey::find_program_address(&[Self::SEED], &crate::ID).0
    }

    /// Address of market `id`, or `None` if no such market was created
    pub fn market_address(&self, id: u64) -> Option<Pubkey> {
        (id < self.next_market_id).then(|| Market::address(id))
    }

    /// Consume the next id. Only called once the new market has validated.
    pub fn record_market(&mut self) -> Result<u64> {
        let id = self.next_market_id;
        self.next_market_id = id.checked_add(1).ok_or(MarketError::MathOverflow)?;
        Ok(id)
    }
}
