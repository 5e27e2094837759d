//! # Constant-Product Pricing
//!
//! Every market holds two virtual reserves, one per outcome. Their product
//!
//! ```text
//!              k = YES × NO
//! ```
//!
//! is the pool invariant. Buying an outcome grows the *other* reserve by the
//! full amount paid and shrinks the bought reserve by the shares handed out:
//!
//! ```text
//! effective_in = amount_in × (10000 − fee_bps) / 10000
//! shares_out   = ⌊ reserve_out × effective_in / (reserve_in + effective_in) ⌋
//!
//! reserve_in'  = reserve_in + amount_in        (gross, fee stays in the pool)
//! reserve_out' = reserve_out − shares_out
//! ```
//!
//! Selling runs the same curve backwards: shares are fed back into their own
//! reserve and value is withdrawn from the opposite one, net of fee.
//!
//! Outputs are always floored, so the retained reserve rounds toward the pool
//! and `k` can only grow.

use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::MarketError;

/// Reserves and output of a single swap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapResult {
    /// Shares (buy) or value (sell) leaving the pool
    pub amount_out: u64,
    /// Reserve that received the input, after the swap
    pub reserve_in: u64,
    /// Reserve that paid the output, after the swap
    pub reserve_out: u64,
}

/// Constant-product curve for binary markets
pub struct ConstantProduct;

impl ConstantProduct {
    /// Marginal cost of `side` in basis points of the quote unit
    ///
    /// `price = other_reserve × 10000 / side_reserve`
    ///
    /// # Example
    /// ```ignore
    /// // 3 SOL yes / 7 SOL no
    /// let price = ConstantProduct::price_of(3_000_000_000, 7_000_000_000)?;
    /// assert_eq!(price, 23_333);
    /// ```
    pub fn price_of(side_reserve: u64, other_reserve: u64) -> Result<u64> {
        require!(side_reserve > 0, MarketError::DivisionByZero);

        let price = (other_reserve as u128)
            .checked_mul(BPS_DENOMINATOR as u128)
            .ok_or(MarketError::MathOverflow)?
            / side_reserve as u128;

        u64::try_from(price).map_err(|_| error!(MarketError::MathOverflow))
    }

    /// Swap `amount_in` of value for shares drawn from `reserve_out`
    ///
    /// # Arguments
    /// * `reserve_in` - Reserve of the outcome *not* being bought
    /// * `reserve_out` - Reserve of the outcome being bought
    /// * `amount_in` - Gross value paid, fee included
    /// * `fee_bps` - Fee skimmed from the input before pricing
    pub fn swap_in(
        reserve_in: u64,
        reserve_out: u64,
        amount_in: u64,
        fee_bps: u16,
    ) -> Result<SwapResult> {
        require!(amount_in > 0, MarketError::InvalidAmount);

        let effective_in = Self::apply_fee(amount_in, fee_bps)?;

        // ⌊out × eff / (in + eff)⌋ == out − ⌈in × out / (in + eff)⌉
        let amount_out = Self::quote(reserve_out, effective_in, reserve_in)?;

        require!(amount_out > 0, MarketError::InvalidAmount);
        require!(amount_out < reserve_out, MarketError::InsufficientLiquidity);

        Ok(SwapResult {
            amount_out,
            reserve_in: reserve_in
                .checked_add(amount_in)
                .ok_or(MarketError::MathOverflow)?,
            reserve_out: reserve_out - amount_out,
        })
    }

    /// Retire `shares_in` into their own reserve and withdraw value from the
    /// opposite reserve, net of fee
    ///
    /// # Arguments
    /// * `reserve_in` - Reserve of the outcome being sold
    /// * `reserve_out` - Reserve the payout is drawn from
    /// * `shares_in` - Shares handed back to the pool
    /// * `fee_bps` - Fee withheld from the gross payout
    ///
    /// The caller is responsible for checking the seller owns `shares_in`.
    pub fn swap_out(
        reserve_in: u64,
        reserve_out: u64,
        shares_in: u64,
        fee_bps: u16,
    ) -> Result<SwapResult> {
        require!(shares_in > 0, MarketError::InvalidAmount);

        let gross = Self::quote(reserve_out, shares_in, reserve_in)?;
        let payout = Self::apply_fee(gross, fee_bps)?;

        require!(payout > 0, MarketError::InvalidAmount);
        require!(payout < reserve_out, MarketError::InsufficientLiquidity);

        Ok(SwapResult {
            amount_out: payout,
            reserve_in: reserve_in
                .checked_add(shares_in)
                .ok_or(MarketError::MathOverflow)?,
            reserve_out: reserve_out - payout,
        })
    }

    /// The pool invariant `k`
    pub fn invariant(reserve_yes: u64, reserve_no: u64) -> u128 {
        reserve_yes as u128 * reserve_no as u128
    }

    /// `amount × (10000 − fee_bps) / 10000`
    fn apply_fee(amount: u64, fee_bps: u16) -> Result<u64> {
        let fee_bps = fee_bps as u64;
        require!(fee_bps < BPS_DENOMINATOR, MarketError::InvalidFee);

        let net = (amount as u128)
            .checked_mul((BPS_DENOMINATOR - fee_bps) as u128)
            .ok_or(MarketError::MathOverflow)?
            / BPS_DENOMINATOR as u128;

        Ok(net as u64)
    }

    /// `⌊reserve × amount / (base + amount)⌋`
    fn quote(reserve: u64, amount: u64, base: u64) -> Result<u64> {
        let denominator = (base as u128)
            .checked_add(amount as u128)
            .ok_or(MarketError::MathOverflow)?;
        require!(denominator > 0, MarketError::DivisionByZero);

        let out = (reserve as u128)
            .checked_mul(amount as u128)
            .ok_or(MarketError::MathOverflow)?
            / denominator;

        // out < reserve whenever base > 0
        u64::try_from(out).map_err(|_| error!(MarketError::MathOverflow))
    }
}

// ============================================================================
// TESTS
// ============================================================================
