//! Payment handlers behind the checkout buttons.
//!
//! Neither handler talks to a payment provider yet. They record the request
//! in the logs and acknowledge it, which is all the checkout needs from them.

use std::sync::Arc;

use panier_core::{PaymentMethod, PaymentRequest};
use serde::Serialize;
use uuid::Uuid;

/// Acknowledgement returned by a handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAck {
    pub method: PaymentMethod,
    /// Reference for correlating logs with the visitor's request.
    pub reference: Uuid,
    pub message: String,
}

/// Something that takes an authorized payment request.
pub trait PaymentHandler: Send + Sync {
    /// The method this handler serves.
    fn method(&self) -> PaymentMethod;

    /// Start the payment.
    fn initiate(&self, request: &PaymentRequest) -> PaymentAck;
}

/// Konnekt online payment (not yet integrated).
#[derive(Debug, Default, Clone, Copy)]
pub struct KonnektHandler;

impl PaymentHandler for KonnektHandler {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Konnekt
    }

    fn initiate(&self, request: &PaymentRequest) -> PaymentAck {
        let reference = Uuid::new_v4();
        tracing::info!(
            %reference,
            amount = %request.amount,
            has_customer = request.customer.is_some(),
            "Processing Konnekt payment"
        );
        PaymentAck {
            method: PaymentMethod::Konnekt,
            reference,
            message: "Konnekt payment requested".to_string(),
        }
    }
}

/// Cash on delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct CashHandler;

impl PaymentHandler for CashHandler {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Cash
    }

    fn initiate(&self, request: &PaymentRequest) -> PaymentAck {
        let reference = Uuid::new_v4();
        tracing::info!(
            %reference,
            amount = %request.amount,
            has_customer = request.customer.is_some(),
            "Processing cash payment"
        );
        PaymentAck {
            method: PaymentMethod::Cash,
            reference,
            message: "Cash on delivery requested".to_string(),
        }
    }
}

/// The registered handlers, one per method.
#[derive(Clone)]
pub struct PaymentHandlers {
    handlers: Vec<Arc<dyn PaymentHandler>>,
}

impl PaymentHandlers {
    /// Handlers for every method, all currently logging stubs.
    #[must_use]
    pub fn stubs() -> Self {
        Self::new(vec![Arc::new(KonnektHandler), Arc::new(CashHandler)])
    }

    #[must_use]
    pub fn new(handlers: Vec<Arc<dyn PaymentHandler>>) -> Self {
        Self { handlers }
    }

    /// The handler for a method, if one is registered.
    #[must_use]
    pub fn for_method(&self, method: PaymentMethod) -> Option<&dyn PaymentHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.method() == method)
            .map(|handler| &**handler)
    }
}

impl std::fmt::Debug for PaymentHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|handler| handler.method()))
            .finish()
    }
}
