#![doc = "hub-sync-core: core pipeline library for hub-sync."]

//! This crate contains all logic for keeping a release-asset store in sync with
//! the packages declared in a hub repository.
//! Network clients for concrete stores are not included here; they implement
//! [`contract::ReleaseStore`] from the outside.
//!
//! # Usage
//! Build a [`config::SynchroniseConfig`], pick a store, and call
//! [`synchronise::synchronise`].

pub mod archive;
pub mod config;
pub mod contract;
pub mod delta;
pub mod error;
pub mod index;
pub mod inventory;
pub mod naming;
pub mod publish;
pub mod scan;
pub mod synchronise;
