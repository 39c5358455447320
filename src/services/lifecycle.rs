//! Who may create, assign and transition an order.
//!
//! Every rule here is a pure function of the caller and the order's current
//! row, so the repository can evaluate it while the row is locked.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderStatus, Profile, Role},
};

/// How the assignee of a new order is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignee {
    /// Assigned to the caller; nothing left to verify.
    Caller(Uuid),
    /// Admin picked someone; the profile must be checked to be a mesero.
    Requested(Uuid),
    Unassigned,
}

impl Assignee {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Assignee::Caller(id) | Assignee::Requested(id) => Some(*id),
            Assignee::Unassigned => None,
        }
    }
}

/// A mesero always owns the orders they create; an admin may leave the
/// order unassigned or hand it to someone else.
pub fn creation_assignee(caller: &AuthUser, requested: Option<Uuid>) -> AppResult<Assignee> {
    match caller.role {
        Role::Mesero => match requested {
            Some(id) if id != caller.user_id => {
                tracing::info!(
                    caller = %caller.user_id,
                    requested = %id,
                    "mesero tried to assign an order to someone else"
                );
                Err(AppError::Forbidden("Mesero can only assign to self".into()))
            }
            _ => Ok(Assignee::Caller(caller.user_id)),
        },
        Role::Admin => Ok(requested.map_or(Assignee::Unassigned, Assignee::Requested)),
    }
}

/// Orders can only be handed to an existing mesero.
pub fn ensure_assignable(target: Option<&Profile>) -> AppResult<()> {
    match target {
        None => Err(AppError::BadRequest("Assigned user not found".into())),
        Some(profile) if profile.role != Role::Mesero => {
            Err(AppError::BadRequest("Assigned user must be mesero".into()))
        }
        Some(_) => Ok(()),
    }
}

pub fn ensure_reassignable(order: &Order) -> AppResult<()> {
    if order.status == OrderStatus::Closed {
        return Err(AppError::Conflict("Closed orders cannot be reassigned".into()));
    }
    Ok(())
}

/// Checks a status change against the order's current row.
///
/// Returns the status to write, or `None` when the order already has it.
pub fn next_status(
    caller: &AuthUser,
    order: &Order,
    requested: OrderStatus,
) -> AppResult<Option<OrderStatus>> {
    let is_admin = caller.role == Role::Admin;
    let is_assignee = order.assigned_to == Some(caller.user_id);

    if !is_admin && !is_assignee {
        return Err(AppError::Forbidden(
            "You can only change status of your assigned orders".into(),
        ));
    }

    if !is_admin && order.status == OrderStatus::Saved && requested != OrderStatus::Closed {
        tracing::info!(
            order_id = order.id,
            from = %order.status,
            to = %requested,
            "mesero may only close saved orders"
        );
        return Err(AppError::Conflict("Mesero can only change saved -> closed".into()));
    }

    if order.status == OrderStatus::Closed && requested != OrderStatus::Closed {
        tracing::info!(order_id = order.id, to = %requested, "blocked reopen");
        return Err(AppError::Conflict("Closed orders cannot be reopened".into()));
    }

    if order.status == requested {
        return Ok(None);
    }
    Ok(Some(requested))
}
