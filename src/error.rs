use chrono::NaiveDate;
use thiserror::Error;

/// Coarse classification of a failure, used by callers that only need to decide how to
/// report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or inconsistent source row. The source table has to be fixed.
    Data,
    /// A share would have been computed over zero sharers.
    DivisionGuard,
    /// Reading or decoding the source failed.
    Io,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid date '{value}' in {table} row {row}")]
    InvalidDate {
        table: &'static str,
        row: usize,
        value: String,
    },

    #[error("Invalid amount '{value}' in {table} row {row}")]
    InvalidAmount {
        table: &'static str,
        row: usize,
        value: String,
    },

    #[error("Negative amount {amount} in {table} row {row}")]
    NegativeAmount {
        table: &'static str,
        row: usize,
        amount: f64,
    },

    #[error("Invalid points value '{value}' in matches row {row}")]
    InvalidPoints { row: usize, value: String },

    #[error("Unknown participant '{name}' in {table} row {row}: not in the known roster")]
    UnknownParticipant {
        table: &'static str,
        row: usize,
        name: String,
    },

    #[error("The placeholder participant cannot be used as {role} in {table} row {row}")]
    SentinelParticipant {
        table: &'static str,
        row: usize,
        role: &'static str,
    },

    #[error("Blank {role} name in {table} row {row}")]
    EmptyParticipant {
        table: &'static str,
        row: usize,
        role: &'static str,
    },

    #[error("Expense dated {0} has no matches logged for that date")]
    MissingAttendance(NaiveDate),

    #[error("No tracked participants attended on {0}; cannot split the expense")]
    EmptyAttendance(NaiveDate),

    #[error("Pooled purchase #{0} has no beneficiaries; cannot split the amount")]
    EmptyBeneficiaries(usize),

    #[error("Invalid teams: {0}")]
    InvalidTeams(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Balance invariant violated: {0}")]
    InvariantViolation(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::EmptyAttendance(_) | LedgerError::EmptyBeneficiaries(_) => {
                ErrorKind::DivisionGuard
            }
            LedgerError::Csv(_) | LedgerError::SerializationError(_) | LedgerError::IoError(_) => {
                ErrorKind::Io
            }
            _ => ErrorKind::Data,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
