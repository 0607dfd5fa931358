use crate::auth::jwt::verify_access_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{OrgId, role::Role};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

/// Principal acting on a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub org_id: OrgId,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already resolved by the auth middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_access_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            role,
            employee_id: claims.employee_id,
            org_id: claims.org_id,
        }))
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if self.role.manages_payroll() {
            Ok(())
        } else {
            Err(AppError::Forbidden("HR/Admin only".to_string()))
        }
    }

    /// Employees may only touch their own records; HR/Admin may touch any.
    pub fn require_self_or_hr(&self, employee_id: u64) -> Result<(), AppError> {
        if self.role.manages_payroll() || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "not allowed to access employee {employee_id}"
            )))
        }
    }

    pub fn own_employee_id(&self) -> Result<u64, AppError> {
        self.employee_id
            .ok_or_else(|| AppError::Forbidden("No employee profile".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            role,
            employee_id,
            org_id: 1,
        }
    }

    #[test]
    fn employees_only_see_themselves() {
        let employee = user(Role::Employee, Some(5));
        assert!(employee.require_self_or_hr(5).is_ok());
        assert!(matches!(
            employee.require_self_or_hr(6),
            Err(AppError::Forbidden(_))
        ));
        assert!(employee.require_hr_or_admin().is_err());

        let hr = user(Role::Hr, None);
        assert!(hr.require_self_or_hr(6).is_ok());
        assert!(hr.own_employee_id().is_err());
    }
}
