//! Binary Market State
//!
//! Each market owns two virtual outcome reserves, the running share totals of
//! its holders and its lifecycle flags. All trade/resolve/settle rules live
//! here as plain methods; instruction handlers only validate accounts and move
//! lamports.
//!
//! ## Lifecycle
//!
//! ```text
//! Created ──▶ Open ──(now >= close_timestamp)──▶ Closed
//!               │                                  │
//!               └──────────── resolve ─────────────┴──▶ Resolved (terminal)
//! ```
//!
//! Every method validates and computes first and only then writes, so a
//! failed call leaves the market untouched.

use anchor_lang::prelude::*;

use crate::amm::ConstantProduct;
use crate::constants::{
    BPS_DENOMINATOR, MAX_CLARIFICATION_LEN, MAX_DISTRIBUTED_HOLDERS, MAX_QUESTION_LEN,
    MIN_FIRST_BUY, PROBABILITY_DENOMINATOR,
};
use crate::errors::MarketError;
use crate::state::Position;

/// Individual prediction market account
///
/// Seeds: ["market", id.to_le_bytes()]
#[account]
#[derive(InitSpace, Debug)]
pub struct Market {
    /// Id allocated by the factory
    pub id: u64,

    /// Registry that created the market
    pub factory: Pubkey,

    /// Wallet that funded the initial liquidity
    pub creator: Pubkey,

    /// The prediction question
    /// Example: "Will SOL close above $300 on Friday?"
    #[max_len(256)]
    pub question: String,

    /// Resolution criteria
    #[max_len(400)]
    pub clarification: String,

    /// Unix timestamp when trading ends
    pub close_timestamp: u64,

    /// Unix timestamp when market was created
    pub created_at: u64,

    /// Sole key allowed to resolve the market
    pub oracle: Pubkey,

    /// Fee on every trade in basis points
    pub fee_bps: u16,

    /// How winners get paid after resolution
    pub payout_mode: PayoutMode,

    /// Virtual YES reserve
    pub reserve_yes: u64,

    /// Virtual NO reserve
    pub reserve_no: u64,

    /// YES shares held across all positions
    pub total_yes_shares: u64,

    /// NO shares held across all positions
    pub total_no_shares: u64,

    /// Positions opened on this market
    pub holder_count: u32,

    /// Lamports deposited: initial liquidity plus buys
    pub value_in: u64,

    /// Lamports paid out: sells plus settlements
    pub value_out: u64,

    pub resolved: bool,

    /// Winning outcome (only valid after resolution)
    pub outcome: Outcome,

    /// `reserve_yes + reserve_no` at resolution
    pub payout_pool: u64,

    /// Winning side's total shares at resolution
    pub winning_supply: u64,

    /// PDA bump seed
    pub bump: u8,

    /// Vault PDA bump seed
    pub vault_bump: u8,
}

/// Outcome side of a trade
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Yes,
    No,
}

/// Prediction outcome
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum Outcome {
    /// Not yet determined
    #[default]
    Undetermined,
    /// YES outcome occurred
    Yes,
    /// NO outcome occurred
    No,
}

/// Market lifecycle status, derived from flags and the clock
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum MarketStatus {
    /// Accepting trades
    Open,
    /// Past close time, awaiting resolution
    Closed,
    /// Outcome set, no further trades
    Resolved,
}

/// Payout strategy chosen at creation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub enum PayoutMode {
    /// `resolve` pays every holder in the same instruction
    #[default]
    Distribute,
    /// `resolve` only sets the outcome; holders call `redeem`
    Claim,
}

/// Arguments of `create_market`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateMarketParams {
    pub question: String,
    pub clarification: String,
    pub close_timestamp: u64,
    pub oracle: Pubkey,
    pub fee_bps: u16,
    /// Lamports seeded into the reserves
    pub initial_value: u64,
    /// Initial YES probability in whole percent
    pub initial_probability: u8,
    pub payout_mode: PayoutMode,
}

/// Read-only view returned by `get_market_state`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub market_id: u64,
    pub factory: Pubkey,
    pub question: String,
    pub clarification: String,
    pub close_timestamp: u64,
    pub oracle: Pubkey,
    pub fee_bps: u16,
    pub payout_mode: PayoutMode,
    pub status: MarketStatus,
    pub reserve_yes: u64,
    pub reserve_no: u64,
    pub price_yes: u64,
    pub price_no: u64,
    pub total_yes_shares: u64,
    pub total_no_shares: u64,
    pub holder_count: u32,
    pub resolved: bool,
    pub outcome: Outcome,
}

impl Market {
    pub const SEED: &'static [u8] = b"market";
    pub const VAULT_SEED: &'static [u8] = b"market_vault";

    /// Address of market `id`
    pub fn address(id: u64) -> Pubkey {
        Pubkey::find_program_address(&[Self::SEED, &id.to_le_bytes()], &crate::ID).0
    }

    /// Address of the lamport vault backing `market`
    pub fn vault_address(market: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[Self::VAULT_SEED, market.as_ref()], &crate::ID).0
    }

    /// Validate creation parameters and seed the reserves
    ///
    /// `reserve_yes = initial_value × probability / 100`, the remainder goes
    /// to `reserve_no`. Bumps are left for the caller to fill in.
    pub fn new(
        id: u64,
        factory: Pubkey,
        creator: Pubkey,
        params: CreateMarketParams,
        min_liquidity: u64,
        now: u64,
    ) -> Result<Self> {
        require!(
            params.initial_value >= min_liquidity,
            MarketError::InsufficientLiquidity
        );
        require!(
            params.initial_probability > 0
                && (params.initial_probability as u64) < PROBABILITY_DENOMINATOR,
            MarketError::InvalidProbability
        );
        require!(
            (params.fee_bps as u64) < BPS_DENOMINATOR,
            MarketError::InvalidFee
        );
        require!(params.close_timestamp > now, MarketError::InvalidCloseTime);
        require!(
            params.question.len() <= MAX_QUESTION_LEN,
            MarketError::QuestionTooLong
        );
        require!(
            params.clarification.len() <= MAX_CLARIFICATION_LEN,
            MarketError::ClarificationTooLong
        );

        let reserve_yes = ((params.initial_value as u128)
            .checked_mul(params.initial_probability as u128)
            .ok_or(MarketError::MathOverflow)?
            / PROBABILITY_DENOMINATOR as u128) as u64;
        let reserve_no = params.initial_value - reserve_yes;

        // Holds for any probability in (0, 100) once initial_value >= 100
        require!(
            reserve_yes > 0 && reserve_no > 0,
            MarketError::InsufficientLiquidity
        );

        Ok(Self {
            id,
            factory,
            creator,
            question: params.question,
            clarification: params.clarification,
            close_timestamp: params.close_timestamp,
            created_at: now,
            oracle: params.oracle,
            fee_bps: params.fee_bps,
            payout_mode: params.payout_mode,
            reserve_yes,
            reserve_no,
            total_yes_shares: 0,
            total_no_shares: 0,
            holder_count: 0,
            value_in: params.initial_value,
            value_out: 0,
            resolved: false,
            outcome: Outcome::Undetermined,
            payout_pool: 0,
            winning_supply: 0,
            bump: 0,
            vault_bump: 0,
        })
    }

    pub fn status(&self, now: u64) -> MarketStatus {
        if self.resolved {
            MarketStatus::Resolved
        } else if now < self.close_timestamp {
            MarketStatus::Open
        } else {
            MarketStatus::Closed
        }
    }

    /// `(side reserve, opposite reserve)`
    pub fn reserves(&self, side: Side) -> (u64, u64) {
        match side {
            Side::Yes => (self.reserve_yes, self.reserve_no),
            Side::No => (self.reserve_no, self.reserve_yes),
        }
    }

    pub fn total_shares(&self, side: Side) -> u64 {
        match side {
            Side::Yes => self.total_yes_shares,
            Side::No => self.total_no_shares,
        }
    }

    pub fn price(&self, side: Side) -> Result<u64> {
        let (side_reserve, other_reserve) = self.reserves(side);
        ConstantProduct::price_of(side_reserve, other_reserve)
    }

    pub fn price_yes(&self) -> Result<u64> {
        self.price(Side::Yes)
    }

    pub fn price_no(&self) -> Result<u64> {
        self.price(Side::No)
    }

    /// Lamports the vault owes beyond its rent reserve
    pub fn locked_value(&self) -> u64 {
        self.value_in.saturating_sub(self.value_out)
    }

    /// Buy `side` shares with `amount` lamports, returns the shares credited
    pub fn buy(
        &mut self,
        position: &mut Position,
        side: Side,
        amount: u64,
        now: u64,
    ) -> Result<u64> {
        self.ensure_tradable(now)?;

        let new_holder = !position.registered;
        if new_holder && self.payout_mode == PayoutMode::Distribute {
            require!(
                self.holder_count < MAX_DISTRIBUTED_HOLDERS,
                MarketError::HolderLimitReached
            );
            require!(amount >= MIN_FIRST_BUY, MarketError::InvalidAmount);
        }

        let (side_reserve, other_reserve) = self.reserves(side);
        let swap = ConstantProduct::swap_in(other_reserve, side_reserve, amount, self.fee_bps)?;

        let held = position
            .shares(side)
            .checked_add(swap.amount_out)
            .ok_or(MarketError::MathOverflow)?;
        let total = self
            .total_shares(side)
            .checked_add(swap.amount_out)
            .ok_or(MarketError::MathOverflow)?;
        let value_in = self
            .value_in
            .checked_add(amount)
            .ok_or(MarketError::MathOverflow)?;
        let holder_count = if new_holder {
            self.holder_count
                .checked_add(1)
                .ok_or(MarketError::MathOverflow)?
        } else {
            self.holder_count
        };

        self.set_reserves(side, swap.reserve_out, swap.reserve_in);
        self.set_total_shares(side, total);
        self.value_in = value_in;
        self.holder_count = holder_count;
        position.set_shares(side, held);
        position.registered = true;

        Ok(swap.amount_out)
    }

    /// Sell `amount` of `side` shares back to the pool, returns the lamports
    /// owed to the seller
    pub fn sell(
        &mut self,
        position: &mut Position,
        side: Side,
        amount: u64,
        now: u64,
    ) -> Result<u64> {
        self.ensure_tradable(now)?;

        let held = position.shares(side);
        require!(held >= amount, MarketError::InsufficientShares);

        let (side_reserve, other_reserve) = self.reserves(side);
        let swap = ConstantProduct::swap_out(side_reserve, other_reserve, amount, self.fee_bps)?;

        let total = self
            .total_shares(side)
            .checked_sub(amount)
            .ok_or(MarketError::MathOverflow)?;
        let value_out = self
            .value_out
            .checked_add(swap.amount_out)
            .ok_or(MarketError::MathOverflow)?;

        self.set_reserves(side, swap.reserve_in, swap.reserve_out);
        self.set_total_shares(side, total);
        self.value_out = value_out;
        position.set_shares(side, held - amount);

        Ok(swap.amount_out)
    }

    /// Set the outcome and snapshot the payout pool
    pub fn resolve(&mut self, caller: Pubkey, yes_wins: bool) -> Result<()> {
        require_keys_eq!(caller, self.oracle, MarketError::Unauthorized);
        require!(!self.resolved, MarketError::AlreadyResolved);

        let payout_pool = self
            .reserve_yes
            .checked_add(self.reserve_no)
            .ok_or(MarketError::MathOverflow)?;
        let (outcome, winning_supply) = if yes_wins {
            (Outcome::Yes, self.total_yes_shares)
        } else {
            (Outcome::No, self.total_no_shares)
        };

        self.resolved = true;
        self.outcome = outcome;
        self.payout_pool = payout_pool;
        self.winning_supply = winning_supply;

        Ok(())
    }

    /// What `position` is owed after resolution
    ///
    /// `payout = winning_shares × payout_pool / winning_supply`
    pub fn payout_for(&self, position: &Position) -> Result<u64> {
        let winning_shares = match self.outcome {
            Outcome::Yes => position.yes_shares,
            Outcome::No => position.no_shares,
            Outcome::Undetermined => return err!(MarketError::NotResolved),
        };
        if winning_shares == 0 || self.winning_supply == 0 {
            return Ok(0);
        }

        let payout = (winning_shares as u128)
            .checked_mul(self.payout_pool as u128)
            .ok_or(MarketError::MathOverflow)?
            / self.winning_supply as u128;

        u64::try_from(payout).map_err(|_| error!(MarketError::MathOverflow))
    }

    /// Pay out (or forfeit) `position` and zero both of its balances
    pub fn settle(&mut self, position: &mut Position) -> Result<u64> {
        require!(self.resolved, MarketError::NotResolved);
        require!(!position.settled, MarketError::AlreadySettled);

        let payout = self.payout_for(position)?;
        require!(
            payout <= self.locked_value(),
            MarketError::InsufficientLiquidity
        );

        let total_yes = self
            .total_yes_shares
            .checked_sub(position.yes_shares)
            .ok_or(MarketError::MathOverflow)?;
        let total_no = self
            .total_no_shares
            .checked_sub(position.no_shares)
            .ok_or(MarketError::MathOverflow)?;
        let value_out = self
            .value_out
            .checked_add(payout)
            .ok_or(MarketError::MathOverflow)?;

        self.total_yes_shares = total_yes;
        self.total_no_shares = total_no;
        self.value_out = value_out;
        position.yes_shares = 0;
        position.no_shares = 0;
        position.settled = true;

        Ok(payout)
    }

    pub fn snapshot(&self, now: u64) -> Result<MarketSnapshot> {
        Ok(MarketSnapshot {
            market_id: self.id,
            factory: self.factory,
            question: self.question.clone(),
            clarification: self.clarification.clone(),
            close_timestamp: self.close_timestamp,
            oracle: self.oracle,
            fee_bps: self.fee_bps,
            payout_mode: self.payout_mode,
            status: self.status(now),
            reserve_yes: self.reserve_yes,
            reserve_no: self.reserve_no,
            price_yes: self.price_yes()?,
            price_no: self.price_no()?,
            total_yes_shares: self.total_yes_shares,
            total_no_shares: self.total_no_shares,
            holder_count: self.holder_count,
            resolved: self.resolved,
            outcome: self.outcome,
        })
    }

    fn ensure_tradable(&self, now: u64) -> Result<()> {
        require!(!self.resolved, MarketError::AlreadyResolved);
        require!(now < self.close_timestamp, MarketError::MarketClosed);
        Ok(())
    }

    fn set_reserves(&mut self, side: Side, side_reserve: u64, other_reserve: u64) {
        match side {
            Side::Yes => {
                self.reserve_yes = side_reserve;
                self.reserve_no = other_reserve;
            }
            Side::No => {
                self.reserve_no = side_reserve;
                self.reserve_yes = other_reserve;
            }
        }
    }

    fn set_total_shares(&mut self, side: Side, total: u64) {
        match side {
            Side::Yes => self.total_yes_shares = total,
            Side::No => self.total_no_shares = total,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
