//! Market Resolution
//!
//! The market's oracle sets the winning outcome. Resolution snapshots the
//! payout pool (`reserve_yes + reserve_no`) and the winning share supply;
//! every winner is owed `shares × pool / supply`.
//!
//! ## Payout modes
//!
//! - **Distribute**: the oracle passes every holder as a
//!   `(position, wallet)` pair in the remaining accounts and all of them are
//!   paid (or forfeited) inside this instruction. A missing, foreign or
//!   repeated holder aborts the whole resolution. A payout that would leave
//!   its wallet below the rent-exempt minimum is deferred: the position stays
//!   unsettled and its holder collects through `redeem`.
//! - **Claim**: only the outcome is recorded; holders call `redeem`.

use anchor_lang::prelude::*;

use super::{pay_from_vault, PayoutSettled};
use crate::errors::MarketError;
use crate::state::{Market, Outcome, PayoutMode, Position};

/// Event emitted when a market is resolved
#[event]
pub struct MarketResolved {
    pub market_id: u64,
    pub outcome: Outcome,
    pub resolver: Pubkey,
    pub payout_pool: u64,
    pub winning_supply: u64,
    pub distributed: u64,
    pub timestamp: i64,
}

/// Accounts for market resolution
#[derive(Accounts)]
pub struct ResolveMarket<'info> {
    /// Oracle configured on the market
    #[account(
        constraint = oracle.key() == market.oracle @ MarketError::Unauthorized
    )]
    pub oracle: Signer<'info>,

    /// Market to resolve
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

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> ResolveMarket<'info> {
    /// Resolve the market with the winning outcome
    pub fn resolve_market(
        &mut self,
        yes_wins: bool,
        holders: &[AccountInfo<'info>],
    ) -> Result<()> {
        let clock = Clock::get()?;

        self.market.resolve(self.oracle.key(), yes_wins)?;

        let distributed = match self.market.payout_mode {
            PayoutMode::Distribute => self.distribute(holders)?,
            PayoutMode::Claim => 0,
        };

        emit!(MarketResolved {
            market_id: self.market.id,
            outcome: self.market.outcome,
            resolver: self.oracle.key(),
            payout_pool: self.market.payout_pool,
            winning_supply: self.market.winning_supply,
            distributed,
            timestamp: clock.unix_timestamp,
        });

        msg!(
            "Market {} resolved: {:?}",
            self.market.id,
            self.market.outcome
        );

        Ok(())
    }

    /// Settle every holder passed as `[position, wallet, position, wallet, ..]`
    fn distribute(&mut self, holders: &[AccountInfo<'info>]) -> Result<u64> {
        require!(
            holders.len() == 2 * self.market.holder_count as usize,
            MarketError::HolderSetIncomplete
        );

        let market_key = self.market.key();
        let rent = Rent::get()?;
        let mut seen: Vec<Pubkey> = Vec::with_capacity(self.market.holder_count as usize);
        let mut distributed: u64 = 0;

        for pair in holders.chunks_exact(2) {
            let (position_info, wallet) = (&pair[0], &pair[1]);
            require_keys_eq!(
                *position_info.owner,
                crate::ID,
                MarketError::PositionMismatch
            );
            require!(
                !seen.contains(position_info.key),
                MarketError::AlreadySettled
            );
            seen.push(position_info.key());

            let settled = {
                let mut data = position_info.try_borrow_mut_data()?;
                let mut position = Position::try_deserialize(&mut &data[..])?;

                require_keys_eq!(position.market, market_key, MarketError::PositionMismatch);
                require_keys_eq!(position.owner, wallet.key(), MarketError::PositionMismatch);

                let payout = self.market.payout_for(&position)?;
                let rent_floor = rent.minimum_balance(wallet.data_len());
                if payout > 0 && wallet.lamports().saturating_add(payout) < rent_floor {
                    None
                } else {
                    let shares = position.balances();
                    let payout = self.market.settle(&mut position)?;

                    let mut serialized = Vec::with_capacity(data.len());
                    position.try_serialize(&mut serialized)?;
                    data[..serialized.len()].copy_from_slice(&serialized);

                    Some((payout, shares))
                }
            };

            let Some((payout, shares)) = settled else {
                msg!("Payout to {} deferred to redeem", wallet.key());
                continue;
            };

            if payout > 0 {
                pay_from_vault(
                    &self.system_program,
                    &self.vault,
                    wallet.clone(),
                    &market_key,
                    self.market.vault_bump,
                    payout,
                )?;
            }

            emit!(PayoutSettled {
                market_id: self.market.id,
                holder: wallet.key(),
                yes_shares: shares.yes,
                no_shares: shares.no,
                payout,
            });

            distributed = distributed
                .checked_add(payout)
                .ok_or(MarketError::MathOverflow)?;
        }

        Ok(distributed)
    }
}
