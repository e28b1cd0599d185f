use oauth1_core::{Error, OAuthContext, OAuthError};

use super::ContextInspector;
use crate::store::ProviderPhase;

type ModeValidator = Box<dyn Fn(&str) -> bool + Send + Sync>;
type Authenticator = Box<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// xAuth credential checks for [`ProviderPhase::CreateAccessToken`].
///
/// Checks run in order: mode present, mode valid, username present,
/// password present, credentials authenticate.
pub struct XAuthValidationInspector {
    validate_mode: ModeValidator,
    authenticate: Authenticator,
}

impl XAuthValidationInspector {
    pub fn new(
        validate_mode: impl Fn(&str) -> bool + Send + Sync + 'static,
        authenticate: impl Fn(&str, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            validate_mode: Box::new(validate_mode),
            authenticate: Box::new(authenticate),
        }
    }
}

impl ContextInspector for XAuthValidationInspector {
    fn inspect_context(
        &self,
        phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        if phase != ProviderPhase::CreateAccessToken {
            return Ok(());
        }

        let mode = present(context.x_auth_mode()).ok_or_else(OAuthError::empty_x_auth_mode)?;
        if !(self.validate_mode)(mode) {
            return Err(OAuthError::invalid_x_auth_mode().into());
        }

        let username =
            present(context.x_auth_username()).ok_or_else(OAuthError::empty_x_auth_username)?;
        let password =
            present(context.x_auth_password()).ok_or_else(OAuthError::empty_x_auth_password)?;
        if !(self.authenticate)(username, password) {
            return Err(OAuthError::failed_x_auth_authentication().into());
        }
        Ok(())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
