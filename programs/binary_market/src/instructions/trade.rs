//! Share Trading
//!
//! Handles buying and selling of YES/NO shares against the market's
//! constant-product reserves. Buys move lamports from the trader into the
//! market vault; sells pay lamports out of the vault, signed by its PDA.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use super::{current_timestamp, pay_from_vault};
use crate::state::{Market, Position, Side};

/// Event emitted when shares are bought
#[event]
pub struct SharesBought {
    pub market_id: u64,
    pub buyer: Pubkey,
    pub is_yes: bool,
    pub value_in: u64,
    pub shares_out: u64,
    pub reserve_yes: u64,
    pub reserve_no: u64,
}

/// Event emitted when shares are sold
#[event]
pub struct SharesSold {
    pub market_id: u64,
    pub seller: Pubkey,
    pub is_yes: bool,
    pub shares_in: u64,
    pub value_out: u64,
    pub reserve_yes: u64,
    pub reserve_no: u64,
}

/// Accounts for trading operations
#[derive(Accounts)]
pub struct Trade<'info> {
    /// Trader
    #[account(mut)]
    pub trader: Signer<'info>,

    /// Market being traded on
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

    /// Trader's balances, opened on first trade
    #[account(
        init_if_needed,
        payer = trader,
        space = 8 + Position::INIT_SPACE,
        seeds = [Position::SEED, market.key().as_ref(), trader.key().as_ref()],
        bump,
    )]
    pub position: Account<'info, Position>,

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Trade<'info> {
    /// Buy YES or NO shares with `amount` lamports
    pub fn buy(&mut self, side: Side, amount: u64, bumps: &TradeBumps) -> Result<u64> {
        let now = current_timestamp()?;

        if self.position.is_new() {
            self.position.owner = self.trader.key();
            self.position.market = self.market.key();
            self.position.bump = bumps.position;
        }

        let shares_out = self.market.buy(&mut self.position, side, amount, now)?;

        transfer(
            CpiContext::new(
                self.system_program.to_account_info(),
                Transfer {
                    from: self.trader.to_account_info(),
                    to: self.vault.to_account_info(),
                },
            ),
            amount,
        )?;

        emit!(SharesBought {
            market_id: self.market.id,
            buyer: self.trader.key(),
            is_yes: side == Side::Yes,
            value_in: amount,
            shares_out,
            reserve_yes: self.market.reserve_yes,
            reserve_no: self.market.reserve_no,
        });

        Ok(shares_out)
    }

    /// Sell `amount` YES or NO shares back to the pool
    pub fn sell(&mut self, side: Side, amount: u64) -> Result<u64> {
        let now = current_timestamp()?;

        let value_out = self.market.sell(&mut self.position, side, amount, now)?;

        pay_from_vault(
            &self.system_program,
            &self.vault,
            self.trader.to_account_info(),
            &self.market.key(),
            self.market.vault_bump,
            value_out,
        )?;

        emit!(SharesSold {
            market_id: self.market.id,
            seller: self.trader.key(),
            is_yes: side == Side::Yes,
            shares_in: amount,
            value_out,
            reserve_yes: self.market.reserve_yes,
            reserve_no: self.market.reserve_no,
        });

        Ok(value_out)
    }
}
