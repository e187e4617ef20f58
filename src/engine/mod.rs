mod payment_engine;

pub use payment_engine::{PaymentEngine, TransactionPage};
