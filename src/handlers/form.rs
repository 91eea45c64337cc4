use crate::actix_web::web::{Data, Json, Path, Query};
use crate::context::AdminToken;
use crate::core::models::common::Pagination;
use crate::core::models::form::{Form, FormSummary, PublicForm, Query as FormQuery};
use crate::core::normalizer::Normalizer;
use crate::core::ports::repository::Manager;
use crate::core::services::form::{form_detail, forms, public_form, save_form};
use crate::error::Error;
use crate::request::{FormFilter, Pagination as PageParam};
use crate::response::Page;
use crate::serde_json::Value;

pub async fn save<M>(_: AdminToken, Json(body): Json<Value>, normalizer: Data<Normalizer>, manager: Data<M>) -> Result<Json<Form>, Error>
where
    M: Manager,
{
    let upsert = normalizer.form(&body)?;
    let form = save_form(manager.tx().await?, upsert).await?;
    Ok(Json(form))
}

pub async fn list<M>(_: AdminToken, Query(param): Query<PageParam>, Query(filter): Query<FormFilter>, manager: Data<M>) -> Result<Json<Page<FormSummary>>, Error>
where
    M: Manager,
{
    let pagination = Pagination::from_page(param.page, param.size);
    let mut store = manager.db().await?;
    let (list, total) = forms(&mut store, FormQuery { active_eq: filter.active }, pagination).await?;
    Ok(Json(Page::new(list, total, pagination.offset / pagination.limit + 1, pagination.limit)))
}

pub async fn detail<M>(_: AdminToken, slug: Path<String>, manager: Data<M>) -> Result<Json<Form>, Error>
where
    M: Manager,
{
    let mut store = manager.db().await?;
    Ok(Json(form_detail(&mut store, &slug.into_inner()).await?))
}

pub async fn public<M>(slug: Path<String>, normalizer: Data<Normalizer>, manager: Data<M>) -> Result<Json<PublicForm>, Error>
where
    M: Manager,
{
    let mut store = manager.db().await?;
    Ok(Json(public_form(&mut store, &normalizer, &slug.into_inner()).await?))
}
