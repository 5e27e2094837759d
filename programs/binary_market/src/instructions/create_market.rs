//! Market Creation
//!
//! Allocates the next id from the factory, initialises the market PDA for that
//! id and moves the creator's initial liquidity into the market vault. If any
//! parameter fails validation the whole transaction aborts, so the factory
//! counter only advances together with a live market.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use super::current_timestamp;
use crate::errors::MarketError;
use crate::state::{CreateMarketParams, Factory, Market};

/// Event emitted when a market is created
#[event]
pub struct MarketCreated {
    pub market_id: u64,
    pub market: Pubkey,
    pub creator: Pubkey,
    pub oracle: Pubkey,
    pub close_timestamp: u64,
    pub fee_bps: u16,
    pub reserve_yes: u64,
    pub reserve_no: u64,
}

#[derive(Accounts)]
pub struct CreateMarket<'info> {
    /// Funds the initial liquidity and account rent
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [Factory::SEED],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    #[account(
        init,
        payer = creator,
        space = 8 + Market::INIT_SPACE,
        seeds = [Market::SEED, factory.next_market_id.to_le_bytes().as_ref()],
        bump,
    )]
    pub market: Box<Account<'info, Market>>,

    /// Lamport vault of the new market
    #[account(
        mut,
        seeds = [Market::VAULT_SEED, market.key().as_ref()],
        bump,
    )]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> CreateMarket<'info> {
    pub fn create_market(
        &mut self,
        params: CreateMarketParams,
        bumps: &CreateMarketBumps,
    ) -> Result<u64> {
        let now = current_timestamp()?;
        let initial_value = params.initial_value;

        let mut market = Market::new(
            self.factory.next_market_id,
            self.factory.key(),
            self.creator.key(),
            params,
            self.factory.min_liquidity,
            now,
        )?;
        market.bump = bumps.market;
        market.vault_bump = bumps.vault;

        // The vault keeps a rent-exempt floor that is never paid out
        let rent_reserve = Rent::get()?
            .minimum_balance(0)
            .saturating_sub(self.vault.lamports());
        let deposit = initial_value
            .checked_add(rent_reserve)
            .ok_or(MarketError::MathOverflow)?;

        transfer(
            CpiContext::new(
                self.system_program.to_account_info(),
                Transfer {
                    from: self.creator.to_account_info(),
                    to: self.vault.to_account_info(),
                },
            ),
            deposit,
        )?;

        let market_id = self.factory.record_market()?;

        emit!(MarketCreated {
            market_id,
            market: self.market.key(),
            creator: self.creator.key(),
            oracle: market.oracle,
            close_timestamp: market.close_timestamp,
            fee_bps: market.fee_bps,
            reserve_yes: market.reserve_yes,
            reserve_no: market.reserve_no,
        });

        msg!(
            "Market {} created at {}: {}",
            market_id,
            self.market.key(),
            market.question
        );

        self.market.set_inner(market);

        Ok(market_id)
    }
}
