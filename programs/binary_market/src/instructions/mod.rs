//! Instruction handlers for the binary market protocol
//!
//! Each instruction represents an action users can take:
//! - `initialize` - Set up the market registry (once)
//! - `create_market` - Create a new market with initial liquidity
//! - `trade` - Buy/sell YES and NO shares
//! - `resolve` - Set the winning outcome (oracle only)
//! - `redeem` - Collect winnings from a claim-mode market
//! - `queries` - Read-only views returned as program return data

pub mod initialize;
pub mod create_market;
pub mod trade;
pub mod resolve;
pub mod redeem;
pub mod queries;

pub use initialize::*;
pub use create_market::*;
pub use trade::*;
pub use resolve::*;
pub use redeem::*;
pub use queries::*;

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::errors::MarketError;
use crate::state::Market;

/// Cluster time as unsigned unix seconds
pub(crate) fn current_timestamp() -> Result<u64> {
    let clock = Clock::get()?;
    u64::try_from(clock.unix_timestamp).map_err(|_| error!(MarketError::MathOverflow))
}

/// Move `amount` lamports out of a market vault, signed by the vault PDA
pub(crate) fn pay_from_vault<'info>(
    system_program: &Program<'info, System>,
    vault: &SystemAccount<'info>,
    recipient: AccountInfo<'info>,
    market: &Pubkey,
    vault_bump: u8,
    amount: u64,
) -> Result<()> {
    let vault_seeds = &[Market::VAULT_SEED, market.as_ref(), &[vault_bump]];
    let vault_signer = &[&vault_seeds[..]];

    transfer(
        CpiContext::new_with_signer(
            system_program.to_account_info(),
            Transfer {
                from: vault.to_account_info(),
                to: recipient,
            },
            vault_signer,
        ),
        amount,
    )
}
