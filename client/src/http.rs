use cashorcut_core::SettlementError;
use cashorcut_protocol::*;
use gloo::net::http::{Request, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{AccountService, SettlementGateway, rejection_for};

fn network_error(err: gloo::net::Error) -> SettlementError {
    SettlementError::Network(err.to_string())
}

/// Browser `fetch` client for the wagering backend.
#[derive(Clone, Debug, Default)]
pub struct HttpGateway {
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Token {token}")),
            None => builder,
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SettlementError> {
        let request = self
            .authorized(Request::post(&self.url(path)))
            .json(body)
            .map_err(network_error)?;
        let response = request.send().await.map_err(network_error)?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SettlementError> {
        let response = self
            .authorized(Request::get(&self.url(path)))
            .send()
            .await
            .map_err(network_error)?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SettlementError> {
        if !response.ok() {
            let status = response.status();
            let body = response.json::<ApiErrorBody>().await.ok();
            log::debug!("{} answered {}", response.url(), status);
            return Err(rejection_for(status, body.as_ref()));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| SettlementError::Malformed(err.to_string()))
    }
}

impl SettlementGateway for HttpGateway {
    async fn authorize_stake(
        &self,
        request: &StakeRequest,
    ) -> Result<StakeResponse, SettlementError> {
        self.post(STAKE_PATH, request).await
    }

    async fn settle_cash_out(
        &self,
        request: &CashoutRequest,
    ) -> Result<CashoutResponse, SettlementError> {
        self.post(CASHOUT_PATH, request).await
    }
}

impl AccountService for HttpGateway {
    async fn fetch_user(&self) -> Result<UserDetails, SettlementError> {
        self.get(USER_PATH).await
    }
}
