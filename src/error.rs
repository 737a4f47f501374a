use thiserror::Error;

/// Errors produced by the M1FP scheme
#[derive(Debug, Error)]
pub enum M1fpError {
    /// Underlying randomness source failed
    #[error("Random number generator failure: {0}")]
    RngFailure(#[from] rand::Error),
    /// Precision below the 128-bit minimum or the decimal digit width
    #[error("Precision {0} bits is too small")]
    PrecisionTooSmall(u16),
    /// Unusable decimal digit width
    #[error("Invalid decimal digit width: {0}")]
    InvalidDigits(u16),
    /// The public parameter does not parse to an irrational in (0,1)
    /// with enough mantissa for the requested precision
    #[error("Invalid irrational parameter")]
    InvalidIrrational,
    /// Message needs more decimal digits than the domain provides
    #[error("Plaintext requires {0} decimal digits")]
    PlaintextTooLong(usize),
    /// Vote outside the supported range
    #[error("Vote {0} out of range")]
    VoteOutOfRange(u64),
    /// Operands disagree on the common denominator
    #[error("Common domain mismatch")]
    DomainMismatch,
    /// Ciphertext component outside the common domain
    #[error("Malformed ciphertext")]
    MalformedCiphertext,
    /// Plaintext digits violate the codec rules
    #[error("Malformed plaintext")]
    MalformedPlaintext,
    /// Serialized public key fails structural checks
    #[error("Malformed public key blob")]
    MalformedKeyBlob,
    /// Homomorphic aggregation of an empty sequence
    #[error("Nothing to aggregate")]
    EmptyAggregation,
}

/// M1FP results
pub type M1fpResult<T> = Result<T, M1fpError>;
