//! Read-only Views
//!
//! None of these instructions mutate state. Each returns its answer as
//! program return data, so clients can simulate them instead of decoding
//! accounts themselves.

use anchor_lang::prelude::*;

use super::current_timestamp;
use crate::state::{Factory, Market, MarketSnapshot, Position, UserBalances};

#[derive(Accounts)]
pub struct FactoryView<'info> {
    #[account(seeds = [Factory::SEED], bump = factory.bump)]
    pub factory: Account<'info, Factory>,
}

impl<'info> FactoryView<'info> {
    /// Id the next `create_market` will assign
    pub fn next_market_id(&self) -> u64 {
        self.factory.next_market_id
    }

    /// Lamports held by the registry account
    pub fn balance(&self) -> u64 {
        self.factory.to_account_info().lamports()
    }

    /// Address of market `id`, or `None` for ids never issued
    pub fn market_address(&self, id: u64) -> Option<Pubkey> {
        self.factory.market_address(id)
    }
}

#[derive(Accounts)]
pub struct MarketView<'info> {
    #[account(
        seeds = [Market::SEED, market.id.to_le_bytes().as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,
}

impl<'info> MarketView<'info> {
    pub fn snapshot(&self) -> Result<MarketSnapshot> {
        self.market.snapshot(current_timestamp()?)
    }

    pub fn price_yes(&self) -> Result<u64> {
        self.market.price_yes()
    }

    pub fn price_no(&self) -> Result<u64> {
        self.market.price_no()
    }
}

#[derive(Accounts)]
pub struct UserBalancesView<'info> {
    #[account(
        seeds = [Market::SEED, market.id.to_le_bytes().as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    /// CHECK: only used to derive the position address
    pub user: UncheckedAccount<'info>,

    /// Absent when the user never traded on this market
    #[account(
        seeds = [Position::SEED, market.key().as_ref(), user.key().as_ref()],
        bump,
    )]
    pub position: Option<Account<'info, Position>>,
}

impl<'info> UserBalancesView<'info> {
    /// `(yes, no)` balances, zero for users without a position
    pub fn balances(&self) -> UserBalances {
        self.position
            .as_ref()
            .map(|position| position.balances())
            .unwrap_or_default()
    }
}
