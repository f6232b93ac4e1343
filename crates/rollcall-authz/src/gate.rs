//! Authorization gate: boolean checks over the resolver, plus a
//! request-scoped memo.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rollcall_core::error::RollcallResult;
use rollcall_core::models::user::User;
use rollcall_core::repository::{RoleRepository, TenantPermissionRepository};
use uuid::Uuid;

use crate::resolver::{CheckKind, PermissionResolver};

/// Side-effect free authorization checks.
pub struct Gate<R: RoleRepository, T: TenantPermissionRepository> {
    resolver: PermissionResolver<R, T>,
}

impl<R: RoleRepository, T: TenantPermissionRepository> Gate<R, T> {
    pub fn new(resolver: PermissionResolver<R, T>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PermissionResolver<R, T> {
        &self.resolver
    }

    pub async fn can(&self, user: &User, permission: &str) -> RollcallResult<bool> {
        self.resolver.check_permission(user, permission).await
    }

    /// `true` if any listed permission is granted; `false` for an empty
    /// list.
    pub async fn can_any(&self, user: &User, permissions: &[&str]) -> RollcallResult<bool> {
        for permission in permissions {
            if self.can(user, permission).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// `true` if every listed permission is granted; `true` for an empty
    /// list.
    pub async fn can_all(&self, user: &User, permissions: &[&str]) -> RollcallResult<bool> {
        for permission in permissions {
            if !self.can(user, permission).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn can_access_module(&self, user: &User, module: &str) -> RollcallResult<bool> {
        self.resolver.check_module(user, module).await
    }

    /// Start a memo for one request.
    pub fn for_request(&self) -> RequestGate<'_, R, T> {
        RequestGate::new(self)
    }
}

type MemoKey = (Uuid, CheckKind, String);

/// Gate wrapper that remembers each decision for the lifetime of one
/// request. Create a new one per request; decisions never carry over.
pub struct RequestGate<'a, R: RoleRepository, T: TenantPermissionRepository> {
    gate: &'a Gate<R, T>,
    memo: Mutex<HashMap<MemoKey, bool>>,
}

impl<'a, R: RoleRepository, T: TenantPermissionRepository> RequestGate<'a, R, T> {
    pub fn new(gate: &'a Gate<R, T>) -> Self {
        Self {
            gate,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub async fn can(&self, user: &User, permission: &str) -> RollcallResult<bool> {
        self.memoized(user, CheckKind::Permission, permission).await
    }

    pub async fn can_any(&self, user: &User, permissions: &[&str]) -> RollcallResult<bool> {
        for permission in permissions {
            if self.can(user, permission).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub async fn can_all(&self, user: &User, permissions: &[&str]) -> RollcallResult<bool> {
        for permission in permissions {
            if !self.can(user, permission).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn can_access_module(&self, user: &User, module: &str) -> RollcallResult<bool> {
        self.memoized(user, CheckKind::Module, module).await
    }

    /// Number of decisions remembered so far.
    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    async fn memoized(&self, user: &User, kind: CheckKind, id: &str) -> RollcallResult<bool> {
        let key = (user.id, kind, id.to_string());
        let cached = self.lock().get(&key).copied();
        if let Some(decision) = cached {
            return Ok(decision);
        }

        let decision = self.gate.resolver.check(user, kind, id).await?;
        self.lock().insert(key, decision);
        Ok(decision)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MemoKey, bool>> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
