//! Plugs the Mercado Pago REST client into the payment engine as a [`PixGateway`].
use log::*;
use mercadopago_tools::{
    helpers::{parse_expiration, transaction_amount},
    MercadoPagoApi,
    MercadoPagoApiError,
    NewPixPayment,
    PaymentResponse,
};
use pix_payment_engine::{
    db_types::PaymentId,
    traits::{ChargeCreated, ChargeStatus, GatewayError, NewCharge, PixGateway},
};

#[derive(Clone)]
pub struct MercadoPagoGateway {
    api: MercadoPagoApi,
}

impl MercadoPagoGateway {
    pub fn new(api: MercadoPagoApi) -> Self {
        Self { api }
    }
}

impl PixGateway for MercadoPagoGateway {
    async fn create_charge(&self, charge: NewCharge) -> Result<ChargeCreated, GatewayError> {
        let payment = NewPixPayment::new(transaction_amount(charge.amount), charge.external_reference.as_str())
            .with_description(charge.description.as_deref())
            .with_payer_email(charge.payer_email.as_deref());
        let response = self.api.create_pix_payment(payment).await.map_err(gateway_error)?;
        let status = charge_status(response)?;
        Ok(ChargeCreated {
            payment_id: status.payment_id,
            status: status.status,
            qr_code: status.qr_code,
            qr_code_base64: status.qr_code_base64,
            expires_at: status.expires_at,
        })
    }

    async fn get_charge(&self, payment_id: &PaymentId) -> Result<ChargeStatus, GatewayError> {
        let response = self.api.get_payment(payment_id.as_str()).await.map_err(gateway_error)?;
        charge_status(response)
    }
}

fn charge_status(response: PaymentResponse) -> Result<ChargeStatus, GatewayError> {
    let id = response.id.ok_or_else(|| GatewayError::InvalidResponse("The payment has no id".into()))?;
    let status = response.status.clone().unwrap_or_else(|| {
        warn!("💳️ Mercado Pago returned payment {id} without a status. Treating it as pending");
        "pending".into()
    });
    Ok(ChargeStatus {
        payment_id: PaymentId::from(id.to_string()),
        status,
        status_detail: response.status_detail.clone(),
        qr_code: response.qr_code().map(String::from),
        qr_code_base64: response.qr_code_base64().map(String::from),
        expires_at: parse_expiration(response.date_of_expiration.as_deref()),
    })
}

fn gateway_error(e: MercadoPagoApiError) -> GatewayError {
    match e {
        MercadoPagoApiError::NotFound(id) | MercadoPagoApiError::InvalidPaymentId(id) => {
            GatewayError::NotFound(PaymentId::from(id))
        },
        MercadoPagoApiError::MissingAccessToken | MercadoPagoApiError::Initialization(_) => {
            GatewayError::Configuration(e.to_string())
        },
        e if e.is_transient() => GatewayError::Unavailable(e.to_string()),
        MercadoPagoApiError::RestResponseError(s) => GatewayError::Unavailable(s),
        MercadoPagoApiError::QueryError { status, message } => GatewayError::Rejected { status, message },
        MercadoPagoApiError::JsonError(_) | MercadoPagoApiError::EmptyResponse => {
            GatewayError::InvalidResponse(e.to_string())
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payment_responses_become_charge_statuses() {
        let json = r#"{
            "id": 123,
            "status": "approved",
            "status_detail": "accredited",
            "date_of_expiration": "2024-05-01T10:00:00.000-04:00",
            "point_of_interaction": {"transaction_data": {"qr_code": "000201", "qr_code_base64": "iVBOR"}}
        }"#;
        let response = serde_json::from_str::<PaymentResponse>(json).unwrap();
        let status = charge_status(response).unwrap();
        assert_eq!(status.payment_id, PaymentId::from("123"));
        assert_eq!(status.status, "approved");
        assert_eq!(status.qr_code.as_deref(), Some("000201"));
        assert_eq!(status.qr_code_base64.as_deref(), Some("iVBOR"));
        assert_eq!(status.expires_at.unwrap().to_rfc3339(), "2024-05-01T14:00:00+00:00");
    }

    #[test]
    fn missing_ids_are_invalid() {
        let response = serde_json::from_str::<PaymentResponse>(r#"{"status": "pending"}"#).unwrap();
        assert!(matches!(charge_status(response), Err(GatewayError::InvalidResponse(_))));
    }

    #[test]
    fn error_mapping() {
        let e = gateway_error(MercadoPagoApiError::QueryError { status: 503, message: "busy".into() });
        assert!(matches!(e, GatewayError::Unavailable(_)));
        let e = gateway_error(MercadoPagoApiError::QueryError { status: 429, message: "slow down".into() });
        assert!(matches!(e, GatewayError::Unavailable(_)));
        let e = gateway_error(MercadoPagoApiError::RestResponseError("connection refused".into()));
        assert!(matches!(e, GatewayError::Unavailable(_)));
        let e = gateway_error(MercadoPagoApiError::InvalidPaymentId("../x".into()));
        assert!(matches!(e, GatewayError::NotFound(_)));
        let e = gateway_error(MercadoPagoApiError::QueryError { status: 400, message: "bad amount".into() });
        assert!(matches!(e, GatewayError::Rejected { status: 400, .. }));
        let e = gateway_error(MercadoPagoApiError::NotFound("9".into()));
        assert!(matches!(e, GatewayError::NotFound(id) if id.as_str() == "9"));
        let e = gateway_error(MercadoPagoApiError::MissingAccessToken);
        assert!(matches!(e, GatewayError::Configuration(_)));
    }
}
