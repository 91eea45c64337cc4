use crate::core::models::{
    common::Pagination,
    form::{Form, FormSummary, PublicForm, Query as FormQuery, Upsert as FormUpsert},
};
use crate::core::normalizer::Normalizer;
use crate::core::ports::repository::{FormCommon, Store, TxStore};
use crate::error::Error;

pub async fn save_form<S>(mut store: S, upsert: FormUpsert) -> Result<Form, Error>
where
    S: TxStore,
{
    let slug = upsert.slug.clone();
    let questions = upsert.schema.questions.len();
    let form = match FormCommon::upsert(&mut store, upsert).await {
        Ok(form) => form,
        Err(e) => {
            store.rollback().await?;
            return Err(e);
        }
    };
    store.commit().await?;
    log::info!("saved form {} with {} questions (active: {})", slug, questions, form.active);
    Ok(form)
}

pub async fn form_detail<S>(store: &mut S, slug: &str) -> Result<Form, Error>
where
    S: Store,
{
    FormCommon::get(store, slug).await?.ok_or_else(|| Error::FormNotFound(slug.into()))
}

pub async fn forms<S>(store: &mut S, query: FormQuery, pagination: Pagination) -> Result<(Vec<FormSummary>, i64), Error>
where
    S: Store,
{
    let total = FormCommon::count(store, &query).await?;
    let forms = FormCommon::query(store, &query, pagination).await?;
    Ok((forms, total))
}

/// Loads a form for a respondent. Inactive forms are reported as such rather
/// than as missing so the caller can tell the two apart.
pub async fn public_form<S>(store: &mut S, normalizer: &Normalizer, slug: &str) -> Result<PublicForm, Error>
where
    S: Store,
{
    let form = form_detail(store, slug).await?;
    if !form.active {
        return Err(Error::FormInactive(form.slug));
    }
    let schema = normalizer.schema(&form.schema);
    Ok(PublicForm {
        slug: form.slug,
        title: form.title,
        description: form.description,
        questions: schema.questions,
    })
}
