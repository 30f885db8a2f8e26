//! Authorization rules. Each check returns `Ok(())` or the error the caller
//! should surface.

use crate::{
  Error, Result,
  review::Review,
  store::Store,
  user::{Role, User},
};

pub fn require_admin(actor: &User) -> Result<()> {
  if actor.role.is_admin() {
    Ok(())
  } else {
    Err(Error::forbidden("Administrator access is required."))
  }
}

pub fn require_provider(actor: &User) -> Result<()> {
  if actor.role == Role::Provider {
    Ok(())
  } else {
    Err(Error::forbidden("Only providers can perform this action."))
  }
}

/// Providers and admins may see inventory management views.
pub fn require_provider_or_admin(actor: &User) -> Result<()> {
  match actor.role {
    Role::Provider | Role::Admin => Ok(()),
    Role::Client => Err(Error::forbidden("Only providers can perform this action.")),
  }
}

/// Store (and, through it, component) mutation: the owning provider or an
/// admin.
pub fn can_manage_store(actor: &User, store: &Store) -> Result<()> {
  if actor.role.is_admin()
    || (actor.role == Role::Provider && actor.id == store.owner_id)
  {
    Ok(())
  } else {
    Err(Error::forbidden("You do not have permission to modify this store."))
  }
}

pub fn can_review(actor: &User, store: &Store) -> Result<()> {
  if actor.role != Role::Client {
    return Err(Error::forbidden("Only clients can review stores."));
  }
  if store.owner_id == actor.id {
    return Err(Error::validation("store", "You cannot review your own store."));
  }
  Ok(())
}

pub fn can_edit_review(actor: &User, review: &Review) -> Result<()> {
  if review.user_id == actor.id {
    Ok(())
  } else {
    Err(Error::forbidden("You do not have permission to modify this review."))
  }
}

pub fn can_delete_review(actor: &User, review: &Review) -> Result<()> {
  if actor.role.is_admin() {
    return Ok(());
  }
  can_edit_review(actor, review)
    .map_err(|_| Error::forbidden("You do not have permission to delete this review."))
}
