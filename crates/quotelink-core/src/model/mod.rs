pub mod ledger;
pub mod record;
pub mod token;

pub use ledger::{Ledger, LedgerVersion};
pub use record::{CompleteRecord, Placeholder, QuoteLinkRecord};
pub use token::{is_temporary_id, RandomTokenSource, TokenSource, TEMPORARY_TOKEN_PREFIX};
