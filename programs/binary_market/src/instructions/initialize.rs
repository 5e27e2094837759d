//! Registry Initialization
//!
//! Creates the singleton factory. Called once at deployment.

use anchor_lang::prelude::*;

use crate::constants::MIN_LIQUIDITY;
use crate::errors::MarketError;
use crate::state::Factory;

/// Event emitted when the registry is created
#[event]
pub struct FactoryInitialized {
    pub admin: Pubkey,
    pub min_liquidity: u64,
}

/// Accounts required for registry initialization
#[derive(Accounts)]
pub struct InitializeFactory<'info> {
    /// Deployer, pays for the registry account
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Registry account (created)
    #[account(
        init,
        payer = admin,
        space = 8 + Factory::INIT_SPACE,
        seeds = [Factory::SEED],
        bump,
    )]
    pub factory: Account<'info, Factory>,

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> InitializeFactory<'info> {
    /// Initialize the registry with an empty market sequence
    pub fn initialize_factory(
        &mut self,
        min_liquidity: u64,
        bumps: &InitializeFactoryBumps,
    ) -> Result<()> {
        require!(
            min_liquidity >= MIN_LIQUIDITY,
            MarketError::InsufficientLiquidity
        );

        self.factory.set_inner(Factory {
            next_market_id: 0,
            min_liquidity,
            bump: bumps.factory,
        });

        emit!(FactoryInitialized {
            admin: self.admin.key(),
            min_liquidity,
        });

        msg!("Factory initialized!");
        msg!("Admin: {}", self.admin.key());
        msg!("Min liquidity: {} lamports", min_liquidity);

        Ok(())
    }
}
