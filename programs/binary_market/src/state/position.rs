//! Holder Positions
//!
//! One account per (market, holder) pair, opened on the holder's first trade.

use anchor_lang::prelude::*;

use super::Side;

/// A participant's share balances in one market
///
/// Seeds: ["position", market, owner]
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct Position {
    /// Wallet that owns the shares and receives payouts
    pub owner: Pubkey,

    /// Market the shares belong to
    pub market: Pubkey,

    pub yes_shares: u64,
    pub no_shares: u64,

    /// Counted in the market's `holder_count`
    pub registered: bool,

    /// Paid out (or forfeited) after resolution
    pub settled: bool,

    /// PDA bump seed
    pub bump: u8,
}

/// Balance pair returned by `get_user_balances`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserBalances {
    pub yes: u64,
    pub no: u64,
}

impl Position {
    pub const SEED: &'static [u8] = b"position";

    pub fn address(market: &Pubkey, owner: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[Self::SEED, market.as_ref(), owner.as_ref()],
            &crate::ID,
        )
        .0
    }

    /// True until the account has been bound to an owner
    pub fn is_new(&self) -> bool {
        self.owner == Pubkey::default()
    }

    pub fn shares(&self, side: Side) -> u64 {
        match side {
            Side::Yes => self.yes_shares,
            Side::No => self.no_shares,
        }
    }

    pub(crate) fn set_shares(&mut self, side: Side, shares: u64) {
        match side {
            Side::Yes => self.yes_shares = shares,
            Side::No => self.no_shares = shares,
        }
    }

    pub fn balances(&self) -> UserBalances {
        UserBalances {
            yes: self.yes_shares,
            no: self.no_shares,
        }
    }
}
