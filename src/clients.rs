pub(crate) mod bookstore;

pub(crate) use bookstore::BookstoreClient;
