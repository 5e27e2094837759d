use anchor_lang::prelude::{AccountInfo, Pubkey};
use anchor_lang::solana_program::entrypoint::ProgramResult;
use anchor_lang::{system_program, AccountDeserialize, AnchorDeserialize, InstructionData, ToAccountMetas};
use solana_program_test::*;
use solana_sdk::{
    account::Account,
    clock::Clock,
    instruction::{AccountMeta, Instruction, InstructionError},
    native_token::LAMPORTS_PER_SOL,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::{Transaction, TransactionError},
};

use binary_market::{
    accounts, instruction, CreateMarketParams, Factory, Market, MarketError, PayoutMode,
    Position, UserBalances, MIN_FIRST_BUY, MIN_LIQUIDITY,
};

const INITIAL_VALUE: u64 = 10 * LAMPORTS_PER_SOL;

fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    binary_market::entry(program_id, accounts, data)
}

fn error_code(error: MarketError) -> u32 {
    anchor_lang::error::ERROR_CODE_OFFSET + error as u32
}

struct TestEnv {
    context: ProgramTestContext,
    oracle: Keypair,
    alice: Keypair,
    bob: Keypair,
}

impl TestEnv {
    async fn start() -> Self {
        let mut program_test = ProgramTest::new(
            "binary_market",
            binary_market::ID,
            processor!(process_instruction),
        );

        let oracle = Keypair::new();
        let alice = Keypair::new();
        let bob = Keypair::new();
        for wallet in [&oracle, &alice, &bob] {
            program_test.add_account(
                wallet.pubkey(),
                Account {
                    lamports: 100 * LAMPORTS_PER_SOL,
                    ..Account::default()
                },
            );
        }

        let context = program_test.start_with_context().await;
        Self {
            context,
            oracle,
            alice,
            bob,
        }
    }

    async fn send(
        &mut self,
        ixs: &[Instruction],
        signers: &[&Keypair],
    ) -> Result<(), BanksClientError> {
        // Fresh blockhash so a repeated instruction is not deduplicated
        let blockhash = self.context.get_new_latest_blockhash().await.unwrap();

        let mut all_signers = vec![&self.context.payer];
        all_signers.extend_from_slice(signers);

        let tx = Transaction::new_signed_with_payer(
            ixs,
            Some(&self.context.payer.pubkey()),
            &all_signers,
            blockhash,
        );
        self.context.banks_client.process_transaction(tx).await
    }

    async fn return_data(&mut self, ix: Instruction) -> Vec<u8> {
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&self.context.payer.pubkey()),
            &[&self.context.payer],
            self.context.last_blockhash,
        );
        let simulation = self
            .context
            .banks_client
            .simulate_transaction(tx)
            .await
            .unwrap();
        simulation
            .simulation_details
            .and_then(|details| details.return_data)
            .map(|data| data.data)
            .unwrap_or_default()
    }

    async fn lamports(&mut self, address: Pubkey) -> u64 {
        self.context
            .banks_client
            .get_balance(address)
            .await
            .unwrap()
    }

    async fn now(&mut self) -> i64 {
        let clock: Clock = self.context.banks_client.get_sysvar().await.unwrap();
        clock.unix_timestamp
    }

    async fn warp_to(&mut self, unix_timestamp: i64) {
        let mut clock: Clock = self.context.banks_client.get_sysvar().await.unwrap();
        clock.unix_timestamp = unix_timestamp;
        self.context.set_sysvar(&clock);
    }

    async fn factory(&mut self) -> Factory {
        let account = self
            .context
            .banks_client
            .get_account(Factory::address())
            .await
            .unwrap()
            .unwrap();
        Factory::try_deserialize(&mut account.data.as_slice()).unwrap()
    }

    async fn market(&mut self, id: u64) -> Market {
        let account = self
            .context
            .banks_client
            .get_account(Market::address(id))
            .await
            .unwrap()
            .unwrap();
        Market::try_deserialize(&mut account.data.as_slice()).unwrap()
    }

    async fn position(&mut self, id: u64, owner: &Pubkey) -> Position {
        let account = self
            .context
            .banks_client
            .get_account(Position::address(&Market::address(id), owner))
            .await
            .unwrap()
            .unwrap();
        Position::try_deserialize(&mut account.data.as_slice()).unwrap()
    }

    async fn initialize_factory(&mut self) {
        let ix = Instruction {
            program_id: binary_market::ID,
            accounts: accounts::InitializeFactory {
                admin: self.context.payer.pubkey(),
                factory: Factory::address(),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::InitializeFactory {
                min_liquidity: MIN_LIQUIDITY,
            }
            .data(),
        };
        self.send(&[ix], &[]).await.unwrap();
    }

    async fn params(&mut self, payout_mode: PayoutMode) -> CreateMarketParams {
        CreateMarketParams {
            question: "Will it rain tomorrow?".to_string(),
            clarification: "Resolves YES on any measurable rainfall".to_string(),
            close_timestamp: (self.now().await + 3_600) as u64,
            oracle: self.oracle.pubkey(),
            fee_bps: 0,
            initial_value: INITIAL_VALUE,
            initial_probability: 30,
            payout_mode,
        }
    }

    fn create_market_ix(&self, id: u64, params: CreateMarketParams) -> Instruction {
        let market = Market::address(id);
        Instruction {
            program_id: binary_market::ID,
            accounts: accounts::CreateMarket {
                creator: self.context.payer.pubkey(),
                factory: Factory::address(),
                market,
                vault: Market::vault_address(&market),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::CreateMarket { params }.data(),
        }
    }

    async fn create_market(&mut self, payout_mode: PayoutMode) -> u64 {
        let id = self.factory().await.next_market_id;
        let params = self.params(payout_mode).await;
        let ix = self.create_market_ix(id, params);
        self.send(&[ix], &[]).await.unwrap();
        id
    }

    fn trade_accounts(id: u64, trader: &Pubkey) -> Vec<AccountMeta> {
        let market = Market::address(id);
        accounts::Trade {
            trader: *trader,
            market,
            vault: Market::vault_address(&market),
            position: Position::address(&market, trader),
            system_program: system_program::ID,
        }
        .to_account_metas(None)
    }

    fn buy_yes_ix(id: u64, trader: &Pubkey, amount: u64) -> Instruction {
        Instruction {
            program_id: binary_market::ID,
            accounts: Self::trade_accounts(id, trader),
            data: instruction::BuyYes { amount }.data(),
        }
    }

    fn buy_no_ix(id: u64, trader: &Pubkey, amount: u64) -> Instruction {
        Instruction {
            program_id: binary_market::ID,
            accounts: Self::trade_accounts(id, trader),
            data: instruction::BuyNo { amount }.data(),
        }
    }

    fn sell_yes_ix(id: u64, trader: &Pubkey, amount: u64) -> Instruction {
        Instruction {
            program_id: binary_market::ID,
            accounts: Self::trade_accounts(id, trader),
            data: instruction::SellYes { amount }.data(),
        }
    }

    fn resolve_ix(&self, id: u64, resolver: &Pubkey, yes_wins: bool, holders: &[Pubkey]) -> Instruction {
        let market = Market::address(id);
        let mut metas = accounts::ResolveMarket {
            oracle: *resolver,
            market,
            vault: Market::vault_address(&market),
            system_program: system_program::ID,
        }
        .to_account_metas(None);
        for holder in holders {
            metas.push(AccountMeta::new(Position::address(&market, holder), false));
            metas.push(AccountMeta::new(*holder, false));
        }

        Instruction {
            program_id: binary_market::ID,
            accounts: metas,
            data: instruction::Resolve { yes_wins }.data(),
        }
    }

    fn redeem_ix(id: u64, holder: &Pubkey) -> Instruction {
        let market = Market::address(id);
        Instruction {
            program_id: binary_market::ID,
            accounts: accounts::Redeem {
                holder: *holder,
                market,
                vault: Market::vault_address(&market),
                position: Position::address(&market, holder),
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::Redeem {}.data(),
        }
    }
}

fn assert_market_error(result: Result<(), BanksClientError>, expected: MarketError) {
    let code = error_code(expected);
    match result.unwrap_err().unwrap() {
        TransactionError::InstructionError(_, InstructionError::Custom(actual)) => {
            assert_eq!(actual, code, "expected {:?}", expected)
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_distribute_market_lifecycle() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;

    let id = env.create_market(PayoutMode::Distribute).await;
    assert_eq!(id, 0);
    assert_eq!(env.factory().await.next_market_id, 1);

    let market = env.market(id).await;
    assert_eq!(market.reserve_yes, 3 * LAMPORTS_PER_SOL);
    assert_eq!(market.reserve_no, 7 * LAMPORTS_PER_SOL);
    assert!(env.lamports(Market::vault_address(&Market::address(id))).await >= INITIAL_VALUE);

    let alice = env.alice.pubkey();
    let bob = env.bob.pubkey();
    let alice_kp = env.alice.insecure_clone();
    let bob_kp = env.bob.insecure_clone();

    env.send(&[TestEnv::buy_yes_ix(id, &alice, LAMPORTS_PER_SOL)], &[&alice_kp])
        .await
        .unwrap();
    env.send(&[TestEnv::buy_no_ix(id, &bob, 2 * LAMPORTS_PER_SOL)], &[&bob_kp])
        .await
        .unwrap();

    let alice_position = env.position(id, &alice).await;
    let bob_position = env.position(id, &bob).await;
    assert!(alice_position.yes_shares > 0);
    assert_eq!(alice_position.no_shares, 0);
    assert!(bob_position.no_shares > 0);
    assert_eq!(env.market(id).await.holder_count, 2);

    // Selling more than held leaves everything untouched
    let result = env
        .send(
            &[TestEnv::sell_yes_ix(id, &alice, alice_position.yes_shares + 1)],
            &[&alice_kp],
        )
        .await;
    assert_market_error(result, MarketError::InsufficientShares);
    assert_eq!(env.position(id, &alice).await.yes_shares, alice_position.yes_shares);

    // Only the oracle may resolve
    let ix = env.resolve_ix(id, &alice, true, &[alice, bob]);
    let result = env.send(&[ix], &[&alice_kp]).await;
    assert_market_error(result, MarketError::Unauthorized);

    let market = env.market(id).await;
    let payout_pool = market.reserve_yes + market.reserve_no;
    let alice_before = env.lamports(alice).await;
    let bob_before = env.lamports(bob).await;

    let oracle = env.oracle.insecure_clone();
    let ix = env.resolve_ix(id, &oracle.pubkey(), true, &[alice, bob]);
    env.send(&[ix], &[&oracle]).await.unwrap();

    // Alice holds every YES share, so she receives the whole pool
    assert_eq!(env.lamports(alice).await, alice_before + payout_pool);
    assert_eq!(env.lamports(bob).await, bob_before);

    let market = env.market(id).await;
    assert!(market.resolved);
    assert_eq!(market.payout_pool, payout_pool);
    assert_eq!(market.total_yes_shares, 0);
    assert_eq!(market.total_no_shares, 0);
    assert!(env.position(id, &alice).await.settled);
    assert!(env.position(id, &bob).await.settled);

    // Trading and resolving are both over
    let result = env
        .send(&[TestEnv::buy_yes_ix(id, &bob, LAMPORTS_PER_SOL)], &[&bob_kp])
        .await;
    assert_market_error(result, MarketError::AlreadyResolved);

    let ix = env.resolve_ix(id, &oracle.pubkey(), false, &[alice, bob]);
    let result = env.send(&[ix], &[&oracle]).await;
    assert_market_error(result, MarketError::AlreadyResolved);
}

#[tokio::test]
async fn test_resolve_requires_every_holder() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;
    let id = env.create_market(PayoutMode::Distribute).await;

    let alice = env.alice.pubkey();
    let bob = env.bob.pubkey();
    let alice_kp = env.alice.insecure_clone();
    let bob_kp = env.bob.insecure_clone();
    env.send(&[TestEnv::buy_yes_ix(id, &alice, LAMPORTS_PER_SOL)], &[&alice_kp])
        .await
        .unwrap();
    env.send(&[TestEnv::buy_yes_ix(id, &bob, LAMPORTS_PER_SOL / 2)], &[&bob_kp])
        .await
        .unwrap();

    let oracle = env.oracle.insecure_clone();
    let ix = env.resolve_ix(id, &oracle.pubkey(), true, &[alice]);
    let result = env.send(&[ix], &[&oracle]).await;
    assert_market_error(result, MarketError::HolderSetIncomplete);

    // Passing one holder twice is caught when the position settles again
    let ix = env.resolve_ix(id, &oracle.pubkey(), true, &[alice, alice]);
    let result = env.send(&[ix], &[&oracle]).await;
    assert_market_error(result, MarketError::AlreadySettled);

    assert!(!env.market(id).await.resolved);
}

#[tokio::test]
async fn test_payout_below_rent_is_deferred_to_redeem() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;
    let id = env.create_market(PayoutMode::Distribute).await;

    let alice = env.alice.pubkey();
    let bob = env.bob.pubkey();
    let alice_kp = env.alice.insecure_clone();
    let bob_kp = env.bob.insecure_clone();

    // Alice opens her slot on NO, then adds a tiny YES stake
    env.send(&[TestEnv::buy_no_ix(id, &alice, LAMPORTS_PER_SOL / 10)], &[&alice_kp])
        .await
        .unwrap();
    env.send(&[TestEnv::buy_yes_ix(id, &alice, 50_000)], &[&alice_kp])
        .await
        .unwrap();
    env.send(&[TestEnv::buy_yes_ix(id, &bob, 5 * LAMPORTS_PER_SOL)], &[&bob_kp])
        .await
        .unwrap();

    // Alice empties her wallet
    let balance = env.lamports(alice).await;
    let payer = env.context.payer.pubkey();
    env.send(&[system_instruction::transfer(&alice, &payer, balance)], &[&alice_kp])
        .await
        .unwrap();
    assert_eq!(env.lamports(alice).await, 0);

    let oracle = env.oracle.insecure_clone();
    let ix = env.resolve_ix(id, &oracle.pubkey(), true, &[alice, bob]);
    env.send(&[ix], &[&oracle]).await.unwrap();

    let market = env.market(id).await;
    assert!(market.resolved);
    assert!(env.position(id, &bob).await.settled);

    let deferred = env.position(id, &alice).await;
    assert!(!deferred.settled);
    assert_eq!(env.lamports(alice).await, 0);
    let owed = (deferred.yes_shares as u128 * market.payout_pool as u128
        / market.winning_supply as u128) as u64;
    assert!(owed > 0);

    // Topped up, she collects through redeem
    env.send(
        &[system_instruction::transfer(&payer, &alice, LAMPORTS_PER_SOL)],
        &[],
    )
    .await
    .unwrap();
    env.send(&[TestEnv::redeem_ix(id, &alice)], &[&alice_kp])
        .await
        .unwrap();
    assert_eq!(env.lamports(alice).await, LAMPORTS_PER_SOL + owed);
    assert!(env.position(id, &alice).await.settled);

    let result = env.send(&[TestEnv::redeem_ix(id, &bob)], &[&bob_kp]).await;
    assert_market_error(result, MarketError::AlreadySettled);
}

#[tokio::test]
async fn test_distribute_market_rejects_dust_first_buy() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;
    let id = env.create_market(PayoutMode::Distribute).await;

    let alice = env.alice.pubkey();
    let alice_kp = env.alice.insecure_clone();
    let result = env
        .send(&[TestEnv::buy_yes_ix(id, &alice, 3)], &[&alice_kp])
        .await;
    assert_market_error(result, MarketError::InvalidAmount);
    assert_eq!(env.market(id).await.holder_count, 0);

    env.send(&[TestEnv::buy_yes_ix(id, &alice, MIN_FIRST_BUY)], &[&alice_kp])
        .await
        .unwrap();
    assert_eq!(env.market(id).await.holder_count, 1);
}

#[tokio::test]
async fn test_claim_market_redeem_after_close() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;
    let id = env.create_market(PayoutMode::Claim).await;

    let alice = env.alice.pubkey();
    let bob = env.bob.pubkey();
    let alice_kp = env.alice.insecure_clone();
    let bob_kp = env.bob.insecure_clone();
    env.send(&[TestEnv::buy_yes_ix(id, &alice, LAMPORTS_PER_SOL)], &[&alice_kp])
        .await
        .unwrap();
    env.send(&[TestEnv::buy_no_ix(id, &bob, LAMPORTS_PER_SOL)], &[&bob_kp])
        .await
        .unwrap();

    let close_timestamp = env.market(id).await.close_timestamp;
    env.warp_to(close_timestamp as i64).await;

    let result = env
        .send(&[TestEnv::buy_no_ix(id, &bob, 3 * LAMPORTS_PER_SOL)], &[&bob_kp])
        .await;
    assert_market_error(result, MarketError::MarketClosed);

    // Claim-mode markets redeem only after resolution
    let result = env.send(&[TestEnv::redeem_ix(id, &bob)], &[&bob_kp]).await;
    assert_market_error(result, MarketError::NotResolved);

    let oracle = env.oracle.insecure_clone();
    let ix = env.resolve_ix(id, &oracle.pubkey(), false, &[]);
    env.send(&[ix], &[&oracle]).await.unwrap();

    let market = env.market(id).await;
    assert_eq!(market.outcome, binary_market::Outcome::No);

    let bob_before = env.lamports(bob).await;
    env.send(&[TestEnv::redeem_ix(id, &bob)], &[&bob_kp])
        .await
        .unwrap();
    assert_eq!(env.lamports(bob).await, bob_before + market.payout_pool);

    let alice_before = env.lamports(alice).await;
    env.send(&[TestEnv::redeem_ix(id, &alice)], &[&alice_kp])
        .await
        .unwrap();
    assert_eq!(env.lamports(alice).await, alice_before);
    assert!(env.position(id, &alice).await.settled);

    let result = env.send(&[TestEnv::redeem_ix(id, &bob)], &[&bob_kp]).await;
    assert_market_error(result, MarketError::AlreadySettled);
}

#[tokio::test]
async fn test_rejected_market_does_not_consume_id() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;

    let mut params = env.params(PayoutMode::Distribute).await;
    params.initial_probability = 0;
    let ix = env.create_market_ix(0, params);
    let result = env.send(&[ix], &[]).await;
    assert_market_error(result, MarketError::InvalidProbability);

    let mut params = env.params(PayoutMode::Distribute).await;
    params.initial_value = MIN_LIQUIDITY - 10_000_000;
    let ix = env.create_market_ix(0, params);
    let result = env.send(&[ix], &[]).await;
    assert_market_error(result, MarketError::InsufficientLiquidity);

    assert_eq!(env.factory().await.next_market_id, 0);

    let id = env.create_market(PayoutMode::Distribute).await;
    assert_eq!(id, 0);
}

#[tokio::test]
async fn test_views_return_market_data() {
    let mut env = TestEnv::start().await;
    env.initialize_factory().await;
    let id = env.create_market(PayoutMode::Distribute).await;

    let factory_metas = accounts::FactoryView {
        factory: Factory::address(),
    }
    .to_account_metas(None);

    let data = env
        .return_data(Instruction {
            program_id: binary_market::ID,
            accounts: factory_metas.clone(),
            data: instruction::GetNextMarketId {}.data(),
        })
        .await;
    assert_eq!(u64::try_from_slice(&data).unwrap(), 1);

    let data = env
        .return_data(Instruction {
            program_id: binary_market::ID,
            accounts: factory_metas.clone(),
            data: instruction::GetMarketAddress { id }.data(),
        })
        .await;
    assert_eq!(
        Option::<Pubkey>::try_from_slice(&data).unwrap(),
        Some(Market::address(id))
    );

    let data = env
        .return_data(Instruction {
            program_id: binary_market::ID,
            accounts: factory_metas.clone(),
            data: instruction::GetMarketAddress { id: 7 }.data(),
        })
        .await;
    assert_eq!(Option::<Pubkey>::try_from_slice(&data).unwrap(), None);

    let factory_lamports = env.lamports(Factory::address()).await;
    let data = env
        .return_data(Instruction {
            program_id: binary_market::ID,
            accounts: factory_metas.clone(),
            data: instruction::GetFactoryBalance {}.data(),
        })
        .await;
    assert!(factory_lamports > 0);
    assert_eq!(u64::try_from_slice(&data).unwrap(), factory_lamports);

    let data = env
        .return_data(Instruction {
            program_id: binary_market::ID,
            accounts: accounts::MarketView {
                market: Market::address(id),
            }
            .to_account_metas(None),
            data: instruction::GetPriceYes {}.data(),
        })
        .await;
    assert_eq!(u64::try_from_slice(&data).unwrap(), 23_333);

    // A wallet that never traded reads as zero balances
    let stranger = Pubkey::new_unique();
    let data = env
        .return_data(Instruction {
            program_id: binary_market::ID,
            accounts: accounts::UserBalancesView {
                market: Market::address(id),
                user: stranger,
                position: None,
            }
            .to_account_metas(None),
            data: instruction::GetUserBalances {}.data(),
        })
        .await;
    assert_eq!(
        UserBalances::try_from_slice(&data).unwrap(),
        UserBalances::default()
    );
}
