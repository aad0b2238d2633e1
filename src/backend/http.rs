use super::{AssetBackend, BackendError, BackendResult};
use crate::config::BackendConfig;
use crate::entity::AssetKind;
use crate::ledger::Investment;
use crate::process::ProcessOrder;
use crate::wire::{
    self, AssetsResponse, InvestmentForm, LoginRequest, LoginResponse, NewEquipment, NewOrder,
    NewPersonnel, ProcessTimesPayload, SharesPayload,
};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// [`AssetBackend`] over the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url: with_trailing_slash(base_url),
        }
    }

    /// Fails on an unparsable `base_url`. Without `request_timeout_secs` the
    /// client's defaults apply.
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            client: builder.build()?,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn investment_form(form: &InvestmentForm) -> Form {
    Form::new()
        .text("round", form.round.clone())
        .text("contract_date", wire::form_date(form.contract_date))
        .text("registration_date", wire::form_date(form.registration_date))
        .text("shares", form.shares.to_string())
        .text("amount", form.amount.to_string())
        .text("investor", form.investor.clone())
        .text("security_type", form.security_type.clone())
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn check(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %body, "backend request failed");
    match status {
        StatusCode::UNAUTHORIZED => Err(BackendError::Unauthorized),
        _ => Err(BackendError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

#[async_trait]
impl AssetBackend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginResponse> {
        let form = Form::new()
            .text("username", request.username.clone())
            .text("password", request.password.clone());
        let response = self
            .client
            .post(self.endpoint("login")?)
            .multipart(form)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn fetch_assets(&self) -> BackendResult<AssetsResponse> {
        tracing::debug!("fetching assets");
        let response = self.client.get(self.endpoint("assets")?).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn save_shares(
        &self,
        kind: AssetKind,
        id: i64,
        payload: &SharesPayload,
    ) -> BackendResult<()> {
        tracing::debug!(%kind, id, projects = payload.shares.len(), "saving shares");
        let response = self
            .client
            .put(self.endpoint(&wire::shares_path(kind, id))?)
            .json(payload)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn create_personnel(&self, request: &NewPersonnel) -> BackendResult<()> {
        let form = Form::new()
            .text("name", request.name.clone())
            .text("department", request.department.clone().unwrap_or_default())
            .text("salary", request.salary.to_string());
        let response = self
            .client
            .post(self.endpoint("personnel")?)
            .multipart(form)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn create_equipment(&self, request: &NewEquipment) -> BackendResult<()> {
        let form = Form::new()
            .text("name", request.name.clone())
            .text("acquisition_cost", request.acquisition_cost.to_string())
            .text("acquisition_date", wire::form_date(request.acquisition_date));
        let response = self
            .client
            .post(self.endpoint("equipment")?)
            .multipart(form)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_orders(&self) -> BackendResult<Vec<ProcessOrder>> {
        let response = self
            .client
            .get(self.endpoint("process/orders")?)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn save_process_times(&self, payload: &ProcessTimesPayload) -> BackendResult<()> {
        let path = format!("process/orders/{}/times", payload.order_id);
        let response = self
            .client
            .put(self.endpoint(&path)?)
            .json(payload)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_order(&self, order: &ProcessOrder) -> BackendResult<()> {
        tracing::debug!(order_id = order.id, status = %order.status, "updating order");
        let path = format!("process/orders/{}", order.id);
        let response = self
            .client
            .put(self.endpoint(&path)?)
            .json(order)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn create_order(&self, request: &NewOrder) -> BackendResult<()> {
        let mut form = Form::new()
            .text("company_name", request.company_name.clone())
            .text("quote_date", wire::form_date(request.quote_date))
            .text("category", request.category.clone())
            .text("product_name", request.product_name.clone())
            .text("quantity", request.quantity.to_string())
            .text("manufacturing_cost", request.manufacturing_cost.to_string())
            .text("total_quote_price", request.total_quote_price.to_string())
            .text("status", request.status.label().to_string())
            .text("due_date", wire::form_date(request.due_date));
        if let Some(amount) = request.actual_order_amount {
            form = form.text("actual_order_amount", amount.to_string());
        }
        let response = self
            .client
            .post(self.endpoint("process/orders")?)
            .multipart(form)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_investments(&self) -> BackendResult<Vec<Investment>> {
        let response = self.client.get(self.endpoint("investments")?).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_investment(&self, form: &InvestmentForm) -> BackendResult<()> {
        let response = self
            .client
            .post(self.endpoint("investments")?)
            .multipart(investment_form(form))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_investment(&self, id: i64, form: &InvestmentForm) -> BackendResult<()> {
        let response = self
            .client
            .put(self.endpoint(&format!("investments/{id}"))?)
            .multipart(investment_form(form))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete_investment(&self, id: i64) -> BackendResult<()> {
        tracing::debug!(id, "deleting investment");
        let response = self
            .client
            .delete(self.endpoint(&format!("investments/{id}"))?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path() {
        let backend = HttpBackend::new(Url::parse("http://localhost:8000/api").unwrap());
        assert_eq!(
            backend.endpoint("/assets").unwrap().as_str(),
            "http://localhost:8000/api/assets"
        );
        assert_eq!(
            backend
                .endpoint(&wire::shares_path(AssetKind::Equipment, 9))
                .unwrap()
                .as_str(),
            "http://localhost:8000/api/equipment/9/shares"
        );
    }

    #[test]
    fn config_with_bad_url_is_rejected() {
        let config = BackendConfig {
            base_url: "not a url".to_string(),
            request_timeout_secs: None,
        };
        assert!(matches!(
            HttpBackend::from_config(&config),
            Err(BackendError::Url(_))
        ));
    }
}
