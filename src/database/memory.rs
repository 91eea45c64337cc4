//! In-process repository used by the test suites.
//!
//! Stores hand out a snapshot of the shared state; a transaction publishes its
//! snapshot on commit and drops it on rollback.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::core::models::{
    common::Pagination,
    form::{Form, FormSummary, Query as FormQuery, Upsert as FormUpsert},
    response::{Insert as ResponseInsert, Query as ResponseQuery, ResponseRecord},
};
use crate::core::ports::repository::{Common, FormCommon, Manager, ResponseCommon, Store, TxStore};
use crate::error::Error;

#[derive(Debug, Clone, Default)]
struct State {
    forms: Vec<Form>,
    responses: Vec<(String, ResponseRecord)>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryManager {
    state: Arc<Mutex<State>>,
}

impl MemoryManager {
    fn snapshot(&self) -> Result<State, Error> {
        let state = self.state.lock().map_err(|e| Error::ServerError(e.to_string()))?;
        Ok(state.clone())
    }
}

pub struct MemoryStore {
    shared: Arc<Mutex<State>>,
    state: State,
    transactional: bool,
}

impl MemoryStore {
    fn publish(&self) -> Result<(), Error> {
        let mut shared = self.shared.lock().map_err(|e| Error::ServerError(e.to_string()))?;
        *shared = self.state.clone();
        Ok(())
    }
}

impl FormCommon for MemoryStore {
    async fn upsert(&mut self, form: FormUpsert) -> Result<Form, Error> {
        let schema = serde_json::to_value(&form.schema)?;
        let now = Utc::now();
        let saved = match self.state.forms.iter_mut().find(|f| f.slug == form.slug) {
            Some(existing) => {
                existing.title = form.schema.title;
                existing.description = form.schema.description;
                existing.active = form.schema.active;
                existing.schema = schema;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let created = Form {
                    slug: form.slug,
                    title: form.schema.title,
                    description: form.schema.description,
                    active: form.schema.active,
                    schema,
                    created_at: now,
                    updated_at: now,
                };
                self.state.forms.push(created.clone());
                created
            }
        };
        if !self.transactional {
            self.publish()?;
        }
        Ok(saved)
    }

    async fn get(&mut self, slug: &str) -> Result<Option<Form>, Error> {
        Ok(self.state.forms.iter().find(|f| f.slug == slug).cloned())
    }

    async fn query(&mut self, query: &FormQuery, pagination: Pagination) -> Result<Vec<FormSummary>, Error> {
        let summaries = self
            .state
            .forms
            .iter()
            .rev()
            .filter(|f| query.active_eq.map_or(true, |active| f.active == active))
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|f| FormSummary {
                slug: f.slug.clone(),
                title: f.title.clone(),
                active: f.active,
                updated_at: f.updated_at,
                response_count: self.state.responses.iter().filter(|(slug, _)| slug == &f.slug).count() as i64,
            })
            .collect();
        Ok(summaries)
    }

    async fn count(&mut self, query: &FormQuery) -> Result<i64, Error> {
        let n = self.state.forms.iter().filter(|f| query.active_eq.map_or(true, |active| f.active == active)).count();
        Ok(n as i64)
    }
}

impl ResponseCommon for MemoryStore {
    async fn insert(&mut self, response: ResponseInsert) -> Result<(), Error> {
        self.state.responses.push((
            response.form_slug,
            ResponseRecord {
                created_at: Utc::now(),
                ip: response.ip,
                answers: response.answers,
            },
        ));
        if !self.transactional {
            self.publish()?;
        }
        Ok(())
    }

    async fn exists(&mut self, query: &ResponseQuery) -> Result<bool, Error> {
        Ok(ResponseCommon::query(self, query).await?.into_iter().next().is_some())
    }

    async fn query(&mut self, query: &ResponseQuery) -> Result<Vec<ResponseRecord>, Error> {
        Ok(self
            .state
            .responses
            .iter()
            .rev()
            .filter(|(slug, r)| slug == &query.form_slug_eq && query.ip_eq.as_ref().map_or(true, |ip| r.ip.as_ref() == Some(ip)))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl Common for MemoryStore {}
impl Store for MemoryStore {}

impl TxStore for MemoryStore {
    async fn commit(self) -> Result<(), Error> {
        self.publish()
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

impl Manager for MemoryManager {
    type Store = MemoryStore;
    type TxStore = MemoryStore;

    async fn db(&self) -> Result<Self::Store, Error> {
        Ok(MemoryStore {
            shared: self.state.clone(),
            state: self.snapshot()?,
            transactional: false,
        })
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        Ok(MemoryStore {
            shared: self.state.clone(),
            state: self.snapshot()?,
            transactional: true,
        })
    }
}
