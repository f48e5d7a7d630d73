//! Sign-in, sign-out and profile maintenance.

use crate::api::MarketplaceApi;
use crate::domain::session::{Session, UserProfile};
use crate::domain::types::AccessToken;
use crate::forms::account::{PasswordChangeForm, ProfileForm, ProfileUpdate, SignInForm};
use crate::services::{ServiceError, ServiceResult};

/// Exchanges credentials for a token and stores it in the session.
pub async fn sign_in<A>(api: &A, session: &Session, form: SignInForm) -> ServiceResult<UserProfile>
where
    A: MarketplaceApi + ?Sized,
{
    form.validate()?;

    let response = api.sign_in(form).await.map_err(|err| {
        log::error!("Failed to sign in: {err}");
        err
    })?;
    let token = AccessToken::new(response.token)?;

    session.init(token, response.user.clone());
    Ok(response.user)
}

pub fn sign_out(session: &Session) {
    if let Some(user) = session.user() {
        log::info!("User {} signed out", user.id);
    }
    session.clear();
}

/// Changes the password of the signed-in account.
pub async fn change_password<A>(
    api: &A,
    session: &Session,
    form: PasswordChangeForm,
) -> ServiceResult<Option<String>>
where
    A: MarketplaceApi + ?Sized,
{
    if !session.is_authenticated() {
        return Err(ServiceError::Unauthorized);
    }
    form.validate()?;

    let response = api.change_password(form).await.map_err(|err| {
        log::error!("Failed to change password: {err}");
        err
    })?;
    Ok(response.message)
}

/// Saves profile changes and refreshes the profile held by the session.
pub async fn update_profile<A>(
    api: &A,
    session: &Session,
    form: &ProfileForm,
) -> ServiceResult<UserProfile>
where
    A: MarketplaceApi + ?Sized,
{
    let token = session.token().ok_or(ServiceError::Unauthorized)?;
    let update = ProfileUpdate::try_from(form)?;

    let profile = api.update_profile(update).await.map_err(|err| {
        log::error!("Failed to update profile: {err}");
        err
    })?;

    session.init(token, profile.clone());
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SignInResponse;
    use crate::api::mock::MockMarketplaceApi;
    use crate::domain::types::{ContactEmail, DisplayName, UserId};
    use crate::forms::FormError;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: UserId::new(9).unwrap(),
            name: DisplayName::new(name).unwrap(),
            email: ContactEmail::new("a@k.com").unwrap(),
            phone: None,
            is_admin: false,
        }
    }

    fn credentials() -> SignInForm {
        SignInForm {
            email: "a@k.com".into(),
            password: "secret-pass".into(),
        }
    }

    #[tokio::test]
    async fn sign_in_stores_token_and_profile() {
        let mut api = MockMarketplaceApi::new();
        api.expect_sign_in()
            .withf(|form| form.email == "a@k.com")
            .times(1)
            .returning(|_| {
                Ok(SignInResponse {
                    token: "tok-123".into(),
                    user: profile("Awa"),
                })
            });
        let session = Session::new();

        let user = sign_in(&api, &session, credentials()).await.unwrap();

        assert_eq!(user.name.as_str(), "Awa");
        assert_eq!(session.token().unwrap().as_str(), "tok-123");

        sign_out(&session);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn invalid_credentials_never_reach_the_backend() {
        let mut api = MockMarketplaceApi::new();
        api.expect_sign_in().times(0);
        let session = Session::new();

        let result = sign_in(&api, &session, SignInForm::default()).await;

        assert!(matches!(
            result,
            Err(ServiceError::Form(FormError::Validation(ref errors))) if errors.len() == 2
        ));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn password_change_requires_session() {
        let mut api = MockMarketplaceApi::new();
        api.expect_change_password().times(0);

        let result = change_password(&api, &Session::new(), PasswordChangeForm::default()).await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[tokio::test]
    async fn profile_update_refreshes_session_user() {
        let mut api = MockMarketplaceApi::new();
        api.expect_update_profile()
            .withf(|update| update.name.as_str() == "Awa Kaboré")
            .times(1)
            .returning(|_| Ok(profile("Awa Kaboré")));
        let session = Session::new();
        session.init(AccessToken::new("tok").unwrap(), profile("Awa"));
        let form = ProfileForm {
            name: "Awa Kaboré".into(),
            email: "a@k.com".into(),
            phone: String::new(),
        };

        update_profile(&api, &session, &form).await.unwrap();

        assert_eq!(session.user().unwrap().name.as_str(), "Awa Kaboré");
        assert_eq!(session.token().unwrap().as_str(), "tok");
    }
}
