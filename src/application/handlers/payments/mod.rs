//! Gateway callback handlers.

mod handle_gateway_webhook;

pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
};
