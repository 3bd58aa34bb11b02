//! Account registration, login and profile lookup.
//!
//! # Responsibility
//! - Create accounts with hashed passwords and hand out bearer tokens.
//! - Authenticate password accounts; accept Google accounts by e-mail.
//!
//! # Invariants
//! - Unknown e-mail and wrong password are indistinguishable (`InvalidCredentials`).
//! - Google accounts never store a password hash.

use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::auth::token::{TokenError, TokenIssuer};
use crate::model::user::{Registration, UserProfile, UserRecord, UserValidationError};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Token plus public profile returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug)]
pub enum AccountServiceError {
    /// Registration or login input is incomplete.
    Invalid(UserValidationError),
    /// An account already uses this e-mail.
    EmailTaken,
    /// Unknown account or wrong password.
    InvalidCredentials,
    /// Token subject has no account anymore.
    UserNotFound,
    Password(PasswordError),
    Token(TokenError),
    StoreUnavailable(RepoError),
}

impl Display for AccountServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::EmailTaken => write!(f, "user with this email already exists"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::UserNotFound => write!(f, "user not found"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Token(err) => write!(f, "{err}"),
            Self::StoreUnavailable(err) => write!(f, "account store unavailable: {err}"),
        }
    }
}

impl Error for AccountServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::Token(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for AccountServiceError {
    fn from(value: UserValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<PasswordError> for AccountServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

impl From<TokenError> for AccountServiceError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

impl From<RepoError> for AccountServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate(_) => Self::EmailTaken,
            other => {
                error!("event=account_store module=account_service status=error error={other}");
                Self::StoreUnavailable(other)
            }
        }
    }
}

/// Account service facade over a user repository and a token issuer.
pub struct AccountService<R: UserRepository> {
    repo: R,
    tokens: TokenIssuer,
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: R, tokens: TokenIssuer) -> Self {
        Self { repo, tokens }
    }

    /// Creates an account and returns a session for it.
    ///
    /// The password is hashed only for non-Google accounts that supplied one.
    pub fn register(&self, registration: Registration) -> Result<AuthSession, AccountServiceError> {
        let registration = registration.normalized()?;
        if self.repo.find_by_email(&registration.email)?.is_some() {
            warn!("event=account_register module=account_service status=rejected reason=email_taken");
            return Err(AccountServiceError::EmailTaken);
        }

        let password_hash = match registration.password.as_deref() {
            Some(password) if !registration.is_google_user => Some(hash_password(password)?),
            _ => None,
        };

        let stored = self.repo.insert_user(&UserRecord {
            email: registration.email,
            display_name: registration.display_name,
            first_name: registration.first_name,
            last_name: registration.last_name,
            photo_url: registration.photo_url,
            password_hash,
            is_google_user: registration.is_google_user,
            registration_date: 0,
        })?;
        info!(
            "event=account_register module=account_service status=ok google={}",
            stored.is_google_user
        );
        self.session_for(&stored)
    }

    /// Authenticates an account and returns a fresh session.
    pub fn login(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<AuthSession, AccountServiceError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(UserValidationError::MissingField("email").into());
        }

        let user = self
            .repo
            .find_by_email(email)?
            .ok_or(AccountServiceError::InvalidCredentials)?;

        if !user.is_google_user {
            let (Some(stored_hash), Some(password)) = (user.password_hash.as_deref(), password)
            else {
                return Err(AccountServiceError::InvalidCredentials);
            };
            if !verify_password(password, stored_hash)? {
                warn!("event=account_login module=account_service status=rejected reason=password_mismatch");
                return Err(AccountServiceError::InvalidCredentials);
            }
        }

        info!("event=account_login module=account_service status=ok");
        self.session_for(&user)
    }

    /// Loads the public profile of the account behind a verified token.
    pub fn profile(&self, email: &str) -> Result<UserProfile, AccountServiceError> {
        self.repo
            .find_by_email(email)?
            .map(|user| user.profile())
            .ok_or(AccountServiceError::UserNotFound)
    }

    fn session_for(&self, user: &UserRecord) -> Result<AuthSession, AccountServiceError> {
        Ok(AuthSession {
            token: self.tokens.issue(&user.email)?,
            user: user.profile(),
        })
    }
}
