//! Form definitions used by the configurable UI.

mod app;
mod store;

pub use app::{FormDto, NewFormDto, UpdateFormDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form {
    pub id: Uuid,
    pub name: String,
    pub is_reference_data: bool,
    pub allow_inline_create: bool,
}

#[derive(Debug, Clone)]
pub struct NewForm {
    pub name: String,
    pub is_reference_data: bool,
    pub allow_inline_create: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateForm {
    pub name: Option<String>,
    pub is_reference_data: Option<bool>,
    pub allow_inline_create: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct FormFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub is_reference_data: Option<bool>,
    pub allow_inline_create: Option<bool>,
}

impl Entity for Form {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct FormDomain;

impl Domain for FormDomain {
    const NAME: &'static str = "form";
    const TABLE: &'static str = "config.forms";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Form;
    type New = NewForm;
    type Update = UpdateForm;
    type Filter = FormFilter;

    fn build(new: NewForm, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> Form {
        Form {
            id,
            name: new.name,
            is_reference_data: new.is_reference_data,
            allow_inline_create: new.allow_inline_create,
        }
    }

    fn apply(form: &mut Form, update: UpdateForm, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(name) = update.name {
            form.name = name;
        }
        if let Some(v) = update.is_reference_data {
            form.is_reference_data = v;
        }
        if let Some(v) = update.allow_inline_create {
            form.allow_inline_create = v;
        }
    }

    fn matches(filter: &FormFilter, form: &Form) -> bool {
        eq_opt(filter.id.as_ref(), &form.id)
            && ilike_opt(filter.name.as_ref(), &form.name)
            && eq_opt(filter.is_reference_data.as_ref(), &form.is_reference_data)
            && eq_opt(filter.allow_inline_create.as_ref(), &form.allow_inline_create)
    }

    fn order_value(form: &Form, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(form.id.into()),
            "name" => Some((&form.name).into()),
            "is_reference_data" => Some(form.is_reference_data.into()),
            "allow_inline_create" => Some(form.allow_inline_create.into()),
            _ => None,
        }
    }

    fn unique_keys(form: &Form) -> Vec<String> {
        vec![format!("name={}", form.name)]
    }
}
