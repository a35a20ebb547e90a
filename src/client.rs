//! HTTP client for the finance backend.
//!
//! The backend exposes password sign-in under `/auth/v1` and PostgREST
//! tables under `/rest/v1`. Both async and blocking client variants are
//! available behind feature flags.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::models::{NewBudget, NewTransaction, UserId};

/// Password sign-in endpoint path.
const TOKEN_PATH: &str = "auth/v1/token";

/// Transactions table path.
const TRANSACTIONS_PATH: &str = "rest/v1/transactions";

/// Budgets table path.
const BUDGETS_PATH: &str = "rest/v1/budgets";

/// PostgREST error code for a relation that does not exist.
const UNDEFINED_TABLE_CODE: &str = "42P01";

/// Header carrying the project API key.
const API_KEY_HEADER: &str = "apikey";

/// Header asking PostgREST to echo written rows.
const PREFER_HEADER: &str = "Prefer";

/// `Prefer` value that makes inserts and updates return the rows.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Body of the password grant request.
#[derive(Serialize)]
struct PasswordGrant<'req> {
    /// Account email.
    email: &'req str,
    /// Account password.
    password: &'req str,
}

/// A new transaction row stamped with its owner.
#[derive(Serialize)]
struct OwnedTransaction<'req> {
    /// Caller-supplied fields.
    #[serde(flatten)]
    row: &'req NewTransaction,
    /// Owner of the row.
    user_id: &'req UserId,
}

/// A new budget row stamped with its owner.
#[derive(Serialize)]
struct OwnedBudget<'req> {
    /// Caller-supplied fields.
    #[serde(flatten)]
    row: &'req NewBudget,
    /// Owner of the row.
    user_id: &'req UserId,
}

/// Error body returned by PostgREST and the auth service.
#[derive(Deserialize)]
struct ErrorBody {
    /// PostgreSQL / PostgREST error code.
    #[serde(default)]
    code: Option<serde_json::Value>,
    /// PostgREST message.
    #[serde(default)]
    message: Option<String>,
    /// Auth service message.
    #[serde(default)]
    error_description: Option<String>,
    /// Alternative auth service message.
    #[serde(default)]
    msg: Option<String>,
}

/// Turns a non-success response into a [`TrackerError`].
///
/// A body carrying the undefined-table code maps to
/// [`TrackerError::MissingTables`]; everything else becomes
/// [`TrackerError::Api`] with the most specific message available.
fn api_error(status: StatusCode, body: String) -> TrackerError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) else {
        return TrackerError::Api {
            status: status.as_u16(),
            message: body,
        };
    };
    if parsed
        .code
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .is_some_and(|code| code == UNDEFINED_TABLE_CODE)
    {
        return TrackerError::MissingTables;
    }
    TrackerError::Api {
        status: status.as_u16(),
        message: parsed
            .message
            .or(parsed.error_description)
            .or(parsed.msg)
            .unwrap_or(body),
    }
}

/// Returns the single row a write echoed back.
fn single_row<T>(rows: Vec<T>, status: StatusCode) -> crate::error::Result<T> {
    rows.into_iter().next().ok_or_else(|| TrackerError::Api {
        status: status.as_u16(),
        message: "backend returned no rows".to_owned(),
    })
}

/// Generates a finance client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Backend base URL.
            base_url: Option<String>,
            /// Project API key.
            api_key: Option<SecretString>,
            /// Pre-existing session.
            session: Option<Session>,
        }

        impl $builder {
            /// Sets the backend base URL, e.g. `https://xyz.supabase.co`.
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the project API key sent with every request.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(SecretString::from(key.into()));
                self
            }

            /// Starts the client already signed in.
            #[inline]
            #[must_use]
            pub fn session(mut self, session: Session) -> Self {
                self.session = Some(session);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Configuration`] if the base URL or API
            /// key is missing, [`TrackerError::Url`] if the base URL does not
            /// parse, and [`TrackerError::Http`] if the HTTP client fails to
            /// build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let mut base = self
                    .base_url
                    .ok_or(TrackerError::Configuration("base URL"))?;
                let api_key = self
                    .api_key
                    .ok_or(TrackerError::Configuration("API key"))?;
                if !base.ends_with('/') {
                    base.push('/');
                }
                let base_url = Url::parse(&base)?;
                tracing::debug!(base_url = %base_url, "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    base_url,
                    api_key,
                    session: self.session,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Backend base URL, always ending with `/`.
            base_url: Url,
            /// Project API key.
            api_key: SecretString,
            /// Current session, if signed in.
            session: Option<Session>,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    base_url: None,
                    api_key: None,
                    session: None,
                }
            }

            /// Returns the current session, if signed in.
            #[inline]
            #[must_use]
            pub const fn session(&self) -> Option<&Session> {
                self.session.as_ref()
            }

            /// Replaces the current session.
            #[inline]
            pub fn set_session(&mut self, session: Session) {
                self.session = Some(session);
            }

            /// Signs in with email and password and keeps the session.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Api`] for rejected credentials, or a
            /// transport or decoding error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_in_with_password(
                &mut self,
                email: &str,
                password: &SecretString,
            ) -> Result<AuthUser> {
                let mut url = self.base_url.join(TOKEN_PATH)?;
                _ = url.query_pairs_mut().append_pair("grant_type", "password");
                tracing::debug!("signing in with password");
                let request = self
                    .authorized(self.http.post(url))
                    .json(&PasswordGrant {
                        email,
                        password: password.expose_secret(),
                    });
                let session: Session = self.execute(request) $( .$await_ext )? ?;
                let user = session.user.clone();
                tracing::debug!(user_id = %user.id, "signed in");
                self.session = Some(session);
                Ok(user)
            }

            /// Fetches the signed-in user's transactions, newest first.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::NotAuthenticated`] without a session,
            /// [`TrackerError::MissingTables`] if the table does not exist, or
            /// another request error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
                let url = self.owned_rows_url(TRANSACTIONS_PATH, Some("date.desc"))?;
                let rows: Vec<Transaction> =
                    self.execute(self.authorized(self.http.get(url))) $( .$await_ext )? ?;
                tracing::debug!(count = rows.len(), "fetched transactions");
                Ok(rows)
            }

            /// Records a transaction and returns the stored row.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for an invalid payload,
            /// [`TrackerError::NotAuthenticated`] without a session, or a
            /// request error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn insert_transaction(
                &self,
                transaction: &NewTransaction,
            ) -> Result<Transaction> {
                transaction.validate()?;
                let user_id = self.user_id()?;
                let url = self.base_url.join(TRANSACTIONS_PATH)?;
                let request = self
                    .authorized(self.http.post(url))
                    .header(PREFER_HEADER, RETURN_REPRESENTATION)
                    .json(&[OwnedTransaction {
                        row: transaction,
                        user_id,
                    }]);
                self.execute_single(request) $( .$await_ext )?
            }

            /// Records several transactions in one request and returns the
            /// stored rows.
            ///
            /// Every payload is validated before anything is sent. An empty
            /// slice makes no request.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for the first invalid
            /// payload, [`TrackerError::NotAuthenticated`] without a session,
            /// or a request error.
            #[inline]
            #[tracing::instrument(skip_all, fields(count = transactions.len()))]
            pub $($async_kw)? fn insert_transactions(
                &self,
                transactions: &[NewTransaction],
            ) -> Result<Vec<Transaction>> {
                for transaction in transactions {
                    transaction.validate()?;
                }
                let user_id = self.user_id()?;
                if transactions.is_empty() {
                    return Ok(Vec::new());
                }
                let url = self.base_url.join(TRANSACTIONS_PATH)?;
                let rows: Vec<OwnedTransaction<'_>> = transactions
                    .iter()
                    .map(|row| OwnedTransaction { row, user_id })
                    .collect();
                let request = self
                    .authorized(self.http.post(url))
                    .header(PREFER_HEADER, RETURN_REPRESENTATION)
                    .json(&rows);
                let created: Vec<Transaction> = self.execute(request) $( .$await_ext )? ?;
                tracing::debug!(count = created.len(), "inserted transactions");
                Ok(created)
            }

            /// Deletes a transaction by ID.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::NotAuthenticated`] without a session, or
            /// a request error.
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
                let url = self.row_url(TRANSACTIONS_PATH, id.as_inner())?;
                let response = self.authorized(self.http.delete(url)).send() $( .$await_ext )? ?;
                let status = response.status();
                tracing::debug!(status = %status, "delete response");
                if status.is_success() {
                    Ok(())
                } else {
                    let body = response.text() $( .$await_ext )? .unwrap_or_default();
                    Err(api_error(status, body))
                }
            }

            /// Fetches the signed-in user's budget limits.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::NotAuthenticated`] without a session,
            /// [`TrackerError::MissingTables`] if the table does not exist, or
            /// another request error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn fetch_budgets(&self) -> Result<Vec<Budget>> {
                let url = self.owned_rows_url(BUDGETS_PATH, None)?;
                let rows: Vec<Budget> =
                    self.execute(self.authorized(self.http.get(url))) $( .$await_ext )? ?;
                tracing::debug!(count = rows.len(), "fetched budgets");
                Ok(rows)
            }

            /// Creates a budget limit and returns the stored row.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for an invalid payload,
            /// [`TrackerError::NotAuthenticated`] without a session, or a
            /// request error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn insert_budget(&self, budget: &NewBudget) -> Result<Budget> {
                budget.validate()?;
                let user_id = self.user_id()?;
                let url = self.base_url.join(BUDGETS_PATH)?;
                let request = self
                    .authorized(self.http.post(url))
                    .header(PREFER_HEADER, RETURN_REPRESENTATION)
                    .json(&[OwnedBudget { row: budget, user_id }]);
                self.execute_single(request) $( .$await_ext )?
            }

            /// Changes a budget limit and returns the updated row.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] for an empty or invalid
            /// update, [`TrackerError::NotAuthenticated`] without a session, or
            /// a request error.
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn update_budget(
                &self,
                id: &BudgetId,
                update: &BudgetUpdate,
            ) -> Result<Budget> {
                update.validate()?;
                let url = self.row_url(BUDGETS_PATH, id.as_inner())?;
                let request = self
                    .authorized(self.http.patch(url))
                    .header(PREFER_HEADER, RETURN_REPRESENTATION)
                    .json(update);
                self.execute_single(request) $( .$await_ext )?
            }

            /// Returns the signed-in user's ID.
            fn user_id(&self) -> Result<&UserId> {
                self.session
                    .as_ref()
                    .map(Session::user_id)
                    .ok_or(TrackerError::NotAuthenticated)
            }

            /// URL selecting every row the signed-in user owns.
            fn owned_rows_url(&self, table: &str, order: Option<&str>) -> Result<Url> {
                let user_id = self.user_id()?;
                let mut url = self.base_url.join(table)?;
                {
                    let mut query = url.query_pairs_mut();
                    _ = query
                        .append_pair("select", "*")
                        .append_pair("user_id", &format!("eq.{user_id}"));
                    if let Some(order) = order {
                        _ = query.append_pair("order", order);
                    }
                }
                Ok(url)
            }

            /// URL selecting one row by ID; requires a session.
            fn row_url(&self, table: &str, id: &str) -> Result<Url> {
                _ = self.user_id()?;
                let mut url = self.base_url.join(table)?;
                _ = url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
                Ok(url)
            }

            /// Adds the API key and bearer token headers.
            ///
            /// The bearer is the session token when signed in, otherwise the
            /// API key itself.
            fn authorized(&self, request: $req_type) -> $req_type {
                let bearer = self
                    .session
                    .as_ref()
                    .map_or(&self.api_key, |session| &session.access_token);
                request
                    .header(API_KEY_HEADER, self.api_key.expose_secret())
                    .header(AUTHORIZATION, format!("Bearer {}", bearer.expose_secret()))
            }

            /// Sends a request and deserializes a JSON success body.
            #[tracing::instrument(skip_all)]
            $($async_kw)? fn execute<Resp: DeserializeOwned>(
                &self,
                request: $req_type,
            ) -> Result<Resp> {
                let response = request.send() $( .$await_ext )? ?;
                let status = response.status();
                tracing::debug!(status = %status, "received response");
                let body = response.text() $( .$await_ext )? ?;
                if status.is_success() {
                    tracing::trace!(body_len = body.len(), "parsing response body");
                    serde_json::from_str(&body).map_err(TrackerError::from)
                } else {
                    tracing::debug!(status = status.as_u16(), body = %body, "API error");
                    Err(api_error(status, body))
                }
            }

            /// Sends a write and returns the one row it echoed back.
            $($async_kw)? fn execute_single<Resp: DeserializeOwned>(
                &self,
                request: $req_type,
            ) -> Result<Resp> {
                let rows: Vec<Resp> = self.execute(request) $( .$await_ext )? ?;
                single_row(rows, StatusCode::OK)
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the finance backend.

    use reqwest::StatusCode;
    use reqwest::header::AUTHORIZATION;
    use secrecy::{ExposeSecret as _, SecretString};
    use serde::de::DeserializeOwned;
    use url::Url;

    use super::{
        API_KEY_HEADER, BUDGETS_PATH, OwnedBudget, OwnedTransaction, PREFER_HEADER,
        PasswordGrant, RETURN_REPRESENTATION, TOKEN_PATH, TRANSACTIONS_PATH, api_error,
        single_row,
    };
    use crate::error::{Result, TrackerError};
    use crate::models::{
        AuthUser, Budget, BudgetId, BudgetUpdate, NewBudget, NewTransaction, Session,
        Transaction, TransactionId, UserId,
    };

    define_client! {
        client_name: FinanceClient,
        builder_name: FinanceClientBuilder,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        client_doc: "Async client for the finance backend.\n\nUse [`FinanceClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinanceClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the finance backend.

    use reqwest::StatusCode;
    use reqwest::header::AUTHORIZATION;
    use secrecy::{ExposeSecret as _, SecretString};
    use serde::de::DeserializeOwned;
    use url::Url;

    use super::{
        API_KEY_HEADER, BUDGETS_PATH, OwnedBudget, OwnedTransaction, PREFER_HEADER,
        PasswordGrant, RETURN_REPRESENTATION, TOKEN_PATH, TRANSACTIONS_PATH, api_error,
        single_row,
    };
    use crate::error::{Result, TrackerError};
    use crate::models::{
        AuthUser, Budget, BudgetId, BudgetUpdate, NewBudget, NewTransaction, Session,
        Transaction, TransactionId, UserId,
    };

    define_client! {
        client_name: FinanceBlockingClient,
        builder_name: FinanceBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        client_doc: "Blocking (synchronous) client for the finance backend.\n\nUse [`FinanceBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinanceBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{FinanceClient, FinanceClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{FinanceBlockingClient, FinanceBlockingClientBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_table_maps_to_missing_tables() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.transactions\" does not exist"}"#;
        let err = api_error(StatusCode::NOT_FOUND, body.to_owned());
        assert!(matches!(err, TrackerError::MissingTables));
    }

    #[test]
    fn postgrest_message_is_kept() {
        let body = r#"{"code":"PGRST301","message":"JWT expired"}"#;
        let err = api_error(StatusCode::UNAUTHORIZED, body.to_owned());
        assert_eq!(err.to_string(), "API error (HTTP 401): JWT expired");
    }

    #[test]
    fn auth_error_description_is_used() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body.to_owned());
        assert!(err.to_string().contains("Invalid login credentials"));
    }

    #[test]
    fn non_json_body_becomes_message() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down".to_owned());
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn numeric_code_does_not_panic() {
        let body = r#"{"code":400,"msg":"bad request"}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body.to_owned());
        assert!(err.to_string().contains("bad request"));
    }

    #[test]
    fn empty_write_response_is_an_error() {
        let err = single_row::<u8>(Vec::new(), StatusCode::CREATED).unwrap_err();
        assert!(matches!(err, TrackerError::Api { status: 201, .. }));
    }

    #[test]
    fn owned_transaction_flattens_payload() {
        let tx = NewTransaction {
            kind: crate::models::TransactionType::Expense,
            category: "Food".to_owned(),
            amount: 12.5,
            description: "Lunch".to_owned(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let user_id = UserId::new("u-1".to_owned());
        let json = serde_json::to_value(OwnedTransaction {
            row: &tx,
            user_id: &user_id,
        })
        .unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["date"], "2024-06-01");
    }
}
