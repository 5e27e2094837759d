//! Protocol-wide constants

use anchor_lang::prelude::*;

/// Smallest initial deposit accepted for a new market (0.1 SOL)
#[constant]
pub const MIN_LIQUIDITY: u64 = 100_000_000;

/// Basis point denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Initial probabilities are whole percentages
pub const PROBABILITY_DENOMINATOR: u64 = 100;

pub const MAX_QUESTION_LEN: usize = 256;
pub const MAX_CLARIFICATION_LEN: usize = 400;

/// Upper bound on holders of a market that pays out inside `resolve`.
/// Each holder costs two accounts in the resolving transaction.
#[constant]
pub const MAX_DISTRIBUTED_HOLDERS: u32 = 12;

/// Smallest first buy that opens a holder slot in a distribute-mode market
#[constant]
pub const MIN_FIRST_BUY: u64 = 10_000_000;
