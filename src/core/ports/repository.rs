use crate::core::models::{
    common::Pagination,
    form::{Form, FormSummary, Query as FormQuery, Upsert as FormUpsert},
    response::{Insert as ResponseInsert, Query as ResponseQuery, ResponseRecord},
};
use crate::error::Error;

pub trait FormCommon {
    /// Inserts the form or overwrites title, description, active flag and schema of an existing slug.
    async fn upsert(&mut self, form: FormUpsert) -> Result<Form, Error>;
    async fn get(&mut self, slug: &str) -> Result<Option<Form>, Error>;
    async fn query(&mut self, query: &FormQuery, pagination: Pagination) -> Result<Vec<FormSummary>, Error>;
    async fn count(&mut self, query: &FormQuery) -> Result<i64, Error>;
}

pub trait ResponseCommon {
    async fn insert(&mut self, response: ResponseInsert) -> Result<(), Error>;
    async fn exists(&mut self, query: &ResponseQuery) -> Result<bool, Error>;
    /// Matching responses, newest first.
    async fn query(&mut self, query: &ResponseQuery) -> Result<Vec<ResponseRecord>, Error>;
}

pub trait Common: FormCommon + ResponseCommon {}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}

pub trait Manager {
    type Store: Store;
    type TxStore: TxStore;
    async fn db(&self) -> Result<Self::Store, Error>;
    async fn tx(&self) -> Result<Self::TxStore, Error>;
}
