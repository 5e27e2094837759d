//! # Binary Market: YES/NO Prediction Markets
//!
//! Permissionless binary prediction markets on Solana, priced by a
//! constant-product AMM and settled by a per-market oracle.
//!
//! ## Overview
//!
//! - A singleton **factory** hands out sequential market ids and maps each id
//!   to its market address.
//! - A **market** holds two virtual reserves seeded from the creator's deposit
//!   according to the initial YES probability. Buying a side moves value into
//!   the opposite reserve and pulls shares out of the chosen one.
//! - Each trader's balances live in a **position** account.
//! - After resolution every winning share is worth
//!   `(reserve_yes + reserve_no) / winning_supply` lamports, paid either
//!   during `resolve` or through `redeem`, depending on the market's
//!   payout mode.

use anchor_lang::prelude::*;

pub mod amm;
pub mod constants;
pub mod errors;
pub mod instructions;
pub mod state;

pub use amm::*;
pub use constants::*;
pub use errors::*;
pub use instructions::*;
pub use state::*;

declare_id!("HmkZALKWw1EbWc1cjg8ysC2z51n3PT5sCTnLJQimMN8H");

#[program]
pub mod binary_market {
    use super::*;

    /// Create the market registry
    pub fn initialize_factory(ctx: Context<InitializeFactory>, min_liquidity: u64) -> Result<()> {
        ctx.accounts.initialize_factory(min_liquidity, &ctx.bumps)
    }

    /// Create a market under the next id, returns that id
    pub fn create_market(ctx: Context<CreateMarket>, params: CreateMarketParams) -> Result<u64> {
        ctx.accounts.create_market(params, &ctx.bumps)
    }

    /// Spend `amount` lamports on YES shares
    pub fn buy_yes(ctx: Context<Trade>, amount: u64) -> Result<u64> {
        ctx.accounts.buy(Side::Yes, amount, &ctx.bumps)
    }

    /// Spend `amount` lamports on NO shares
    pub fn buy_no(ctx: Context<Trade>, amount: u64) -> Result<u64> {
        ctx.accounts.buy(Side::No, amount, &ctx.bumps)
    }

    /// Sell `amount` YES shares, returns lamports paid
    pub fn sell_yes(ctx: Context<Trade>, amount: u64) -> Result<u64> {
        ctx.accounts.sell(Side::Yes, amount)
    }

    /// Sell `amount` NO shares, returns lamports paid
    pub fn sell_no(ctx: Context<Trade>, amount: u64) -> Result<u64> {
        ctx.accounts.sell(Side::No, amount)
    }

    /// Resolve the market (oracle only)
    ///
    /// Distribute-mode markets expect every holder in the remaining accounts
    /// as `[position, wallet]` pairs.
    pub fn resolve<'info>(
        ctx: Context<'_, '_, '_, 'info, ResolveMarket<'info>>,
        yes_wins: bool,
    ) -> Result<()> {
        ctx.accounts.resolve_market(yes_wins, ctx.remaining_accounts)
    }

    /// Collect the payout of a claim-mode position
    pub fn redeem(ctx: Context<Redeem>) -> Result<u64> {
        ctx.accounts.redeem()
    }

    pub fn get_next_market_id(ctx: Context<FactoryView>) -> Result<u64> {
        Ok(ctx.accounts.next_market_id())
    }

    pub fn get_market_address(ctx: Context<FactoryView>, id: u64) -> Result<Option<Pubkey>> {
        Ok(ctx.accounts.market_address(id))
    }

    pub fn get_factory_balance(ctx: Context<FactoryView>) -> Result<u64> {
        Ok(ctx.accounts.balance())
    }

    pub fn get_market_state(ctx: Context<MarketView>) -> Result<MarketSnapshot> {
        ctx.accounts.snapshot()
    }

    /// YES price in basis points of NO
    pub fn get_price_yes(ctx: Context<MarketView>) -> Result<u64> {
        ctx.accounts.price_yes()
    }

    pub fn get_price_no(ctx: Context<MarketView>) -> Result<u64> {
        ctx.accounts.price_no()
    }

    pub fn get_user_balances(ctx: Context<UserBalancesView>) -> Result<UserBalances> {
        Ok(ctx.accounts.balances())
    }
}
