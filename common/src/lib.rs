//! Wrapmint common library
//!
//! Access-control subsystem for a wrapped asset: per address and per
//! operation, decides whether that address is currently authorized to hold
//! or move the wrapped asset.
//!
//! Components, leaf first:
//! - [`whitelist::StaticWhitelistController`] - owner-managed membership set
//! - [`whitelist::CredentialWindowController`] - freshness window over an
//!   external credentials source
//! - [`whitelist::WhitelistControllerAggregator`] - OR-combination of any
//!   number of controllers behind a two-tier caller-authorization model
//! - [`token::WrappedToken`] - 1:1 wrapper consulting the aggregator before
//!   every transfer-affecting operation
//! - [`factory::WrappedTokenFactory`] - deploys tokens sharing one
//!   aggregator and manages the references new deployments use

pub mod crypto;
pub mod factory;
pub mod registry;
pub mod time;
pub mod token;
pub mod whitelist;
