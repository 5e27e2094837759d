//! Position Redemption
//!
//! Holders collect their share of the payout pool individually after
//! resolution: every holder of a claim-mode market, and holders of a
//! distribute-mode market whose payout `resolve` deferred.
//!
//! ## Redemption Calculation
//!
//! ```text
//! payout = (winning_shares / winning_supply) * payout_pool
//! ```
//!
//! For example:
//! - User holds 100 YES shares
//! - Total YES shares at resolution: 1000
//! - Payout pool: 5 SOL
//! - If YES wins: user receives (100/1000) * 5 = 0.5 SOL
//!
//! Losing positions settle for zero.

use anchor_lang::prelude::*;

use super::pay_from_vault;
use crate::state::{Market, Position};

/// Event emitted when a position is paid out or forfeited
#[event]
pub struct PayoutSettled {
    pub market_id: u64,
    pub holder: Pubkey,
    pub yes_shares: u64,
    pub no_shares: u64,
    pub payout: u64,
}

/// Accounts for redemption
#[derive(Accounts)]
pub struct Redeem<'info> {
    /// Holder redeeming their position
    #[account(mut)]
    pub holder: Signer<'info>,

    /// Resolved market
    #[account(
        mut,
        seeds = [Market::SEED, market.id.to_le_bytes().as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    /// Market's lamport vault
    #[account(
        mut,
        seeds = [Market::VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump,
    )]
    pub vault: SystemAccount<'info>,

    /// Holder's position
    #[account(
        mut,
        seeds = [Position::SEED, market.key().as_ref(), holder.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, Position>,

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Redeem<'info> {
    /// Redeem the position for its share of the payout pool
    pub fn redeem(&mut self) -> Result<u64> {
        let shares = self.position.balances();
        let payout = self.market.settle(&mut self.position)?;

        if payout > 0 {
            pay_from_vault(
                &self.system_program,
                &self.vault,
                self.holder.to_account_info(),
                &self.market.key(),
                self.market.vault_bump,
                payout,
            )?;
        }

        emit!(PayoutSettled {
            market_id: self.market.id,
            holder: self.holder.key(),
            yes_shares: shares.yes,
            no_shares: shares.no,
            payout,
        });

        Ok(payout)
    }
}
