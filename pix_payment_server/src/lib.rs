//! # PIX payment server
//! This crate hosts the HTTP server for PIX checkouts. It is responsible for:
//! * Accepting checkout requests, reserving stock and returning the PIX QR code to pay with.
//! * Letting buyers refresh or cancel a pending payment.
//! * Receiving Mercado Pago's payment notifications and passing them on to the payment engine.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout/pix`: Creates a PIX checkout.
//! * `/checkout/pix/{payment_id}/refresh`: Brings a payment up to date with Mercado Pago.
//! * `/checkout/orders/{order_id}/cancel`: Cancels a pending order.
//! * `/orders/{order_id}`: Fetches an order and its items.
//! * `/inventory/{product_id}`: Reads (GET) or sets (PUT) the stock level of a product.
//! * `/webhooks/mercadopago`: The webhook route for Mercado Pago payment notifications.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
