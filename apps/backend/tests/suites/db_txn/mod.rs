mod shared_txn;
mod with_txn;
