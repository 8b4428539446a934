mod checkout;
mod helpers;
mod inventory;
mod webhook;
