use anchor_lang::prelude::*;

#[error_code]
pub enum MarketError {
    #[msg("Initial liquidity below minimum, or swap would drain a reserve")]
    InsufficientLiquidity,
    #[msg("Initial probability must be strictly between 0 and 100")]
    InvalidProbability,
    #[msg("Not enough shares to sell")]
    InsufficientShares,
    #[msg("Only the market oracle can resolve this market")]
    Unauthorized,
    #[msg("Market is closed for trading")]
    MarketClosed,
    #[msg("Market has already been resolved")]
    AlreadyResolved,
    #[msg("Amount must be positive and produce a non-zero result")]
    InvalidAmount,
    #[msg("Division by zero")]
    DivisionByZero,
    #[msg("Fee must be below 10000 bps")]
    InvalidFee,
    #[msg("Close time must be in the future")]
    InvalidCloseTime,
    #[msg("Question exceeds maximum length")]
    QuestionTooLong,
    #[msg("Clarification exceeds maximum length")]
    ClarificationTooLong,
    #[msg("Arithmetic overflow")]
    MathOverflow,
    #[msg("Market has reached its holder limit")]
    HolderLimitReached,
    #[msg("Resolution must include every holder of the market")]
    HolderSetIncomplete,
    #[msg("Position does not belong to this market or wallet")]
    PositionMismatch,
    #[msg("Position has already been settled")]
    AlreadySettled,
    #[msg("Market is not resolved")]
    NotResolved,
}

/// Asserts that `result` failed with `expected`, comparing stable error codes
#[cfg(test)]
pub(crate) fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: MarketError) {
    let code = expected as u32 + anchor_lang::error::ERROR_CODE_OFFSET;
    match result {
        Err(anchor_lang::error::Error::AnchorError(err)) => assert_eq!(
            err.error_code_number, code,
            "expected {:?}, got {}",
            expected, err.error_name
        ),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}
