use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    NewOwner, NewProperty, OwnerId, OwnerUpdate, PropertyId, PropertyType, PropertyUpdate,
};
use super::repository::{MessageChannel, OwnerRepository};
use super::service::OwnerServiceError;
use super::PropertyRegister;
use crate::error::AppError;

type Shared<R, C> = State<Arc<PropertyRegister<R, C>>>;

/// HTTP surface over owners, properties, rates, recounts and debtor notifications.
pub fn register_router<R, C>(register: Arc<PropertyRegister<R, C>>) -> Router
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Router::new()
        .route(
            "/api/v1/owners",
            get(list_owners::<R, C>).post(create_owner::<R, C>),
        )
        .route("/api/v1/owners/debtors", get(list_debtors::<R, C>))
        .route(
            "/api/v1/owners/:owner_id",
            get(get_owner::<R, C>)
                .put(update_owner::<R, C>)
                .delete(remove_owner::<R, C>),
        )
        .route(
            "/api/v1/owners/:owner_id/tax-obligation",
            get(tax_obligation::<R, C>),
        )
        .route(
            "/api/v1/owners/:owner_id/properties",
            get(list_properties::<R, C>).post(create_property::<R, C>),
        )
        .route(
            "/api/v1/owners/:owner_id/properties/:property_id",
            put(update_property::<R, C>).delete(remove_property::<R, C>),
        )
        .route("/api/v1/debts/recount", post(recount_debts::<R, C>))
        .route("/api/v1/debts/surcharge", post(accrue_surcharge::<R, C>))
        .route(
            "/api/v1/notifications/debtors",
            post(notify_all_debtors::<R, C>),
        )
        .route(
            "/api/v1/notifications/debtors/:owner_id",
            post(notify_debtor::<R, C>),
        )
        .route("/api/v1/tax-rates", get(list_tax_rates::<R, C>))
        .route(
            "/api/v1/tax-rates/:property_type",
            put(change_tax_rate::<R, C>),
        )
        .with_state(register)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaxChangeRequest {
    pub(crate) tax: Decimal,
}

pub(crate) async fn list_owners<R, C>(
    State(register): Shared<R, C>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.owners.all_owners()?))
}

pub(crate) async fn list_debtors<R, C>(
    State(register): Shared<R, C>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.owners.find_debtors()?))
}

pub(crate) async fn create_owner<R, C>(
    State(register): Shared<R, C>,
    Json(owner): Json<NewOwner>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let stored = register.owners.add_owner(owner)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn get_owner<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.owners.owner_by_id(OwnerId(owner_id))?))
}

pub(crate) async fn update_owner<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
    Json(update): Json<OwnerUpdate>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.owners.update_info(OwnerId(owner_id), update)?))
}

pub(crate) async fn remove_owner<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let removed = register.owners.remove_owner(OwnerId(owner_id))?;
    Ok(Json(json!({ "removed": removed })))
}

pub(crate) async fn tax_obligation<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.owners.tax_assessment(OwnerId(owner_id))?))
}

pub(crate) async fn list_properties<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.owners.properties(OwnerId(owner_id))?))
}

pub(crate) async fn create_property<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
    Json(property): Json<NewProperty>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let stored = register
        .owners
        .add_property(OwnerId(owner_id), property)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn update_property<R, C>(
    State(register): Shared<R, C>,
    Path((owner_id, property_id)): Path<(u64, u64)>,
    Json(update): Json<PropertyUpdate>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    register
        .owners
        .update_property(OwnerId(owner_id), PropertyId(property_id), update)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn remove_property<R, C>(
    State(register): Shared<R, C>,
    Path((owner_id, property_id)): Path<(u64, u64)>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let removed = register
        .owners
        .remove_property(OwnerId(owner_id), PropertyId(property_id))?;
    Ok(Json(json!({ "removed": removed })))
}

pub(crate) async fn recount_debts<R, C>(
    State(register): Shared<R, C>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.recount.run()?))
}

pub(crate) async fn accrue_surcharge<R, C>(
    State(register): Shared<R, C>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.recount.accrue_surcharge()?))
}

pub(crate) async fn notify_all_debtors<R, C>(
    State(register): Shared<R, C>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let summary = register.notifications.notify_all_debtors()?;
    Ok((StatusCode::ACCEPTED, Json(summary)))
}

pub(crate) async fn notify_debtor<R, C>(
    State(register): Shared<R, C>,
    Path(owner_id): Path<u64>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let event = register
        .notifications
        .notify_debtor_by_id(OwnerId(owner_id))?;
    Ok((StatusCode::ACCEPTED, Json(event)))
}

pub(crate) async fn list_tax_rates<R, C>(
    State(register): Shared<R, C>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    Ok(Json(register.rates.get_all()))
}

pub(crate) async fn change_tax_rate<R, C>(
    State(register): Shared<R, C>,
    Path(raw_type): Path<String>,
    Json(request): Json<TaxChangeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: OwnerRepository + 'static,
    C: MessageChannel + 'static,
{
    let property_type =
        PropertyType::parse(&raw_type).ok_or(AppError::UnknownPropertyType(raw_type))?;
    if request.tax.is_sign_negative() {
        return Err(OwnerServiceError::Validation("tax rate cannot be negative".to_string()).into());
    }
    if !register.rates.change_tax(property_type, request.tax) {
        return Err(AppError::UnknownPropertyType(
            property_type.label().to_string(),
        ));
    }
    Ok(Json(register.rates.get_all()))
}
