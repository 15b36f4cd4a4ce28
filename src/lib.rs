//! Test fixtures for the hive cluster operator.
//!
//! Two halves:
//! - option-based builders for hive resources, starting with
//!   [`clusterdeployment`], on top of the generic [`object_builder`]
//! - fake typed clients ([`client`], [`typed`]) that record every call on an
//!   in-memory [`Fake`] fixture seeded through [`FakeBuilder`]
//!
//! # Examples
//!
//! ## Building objects
//!
//! ```rust
//! use hive_testing::apis::hive::ClusterPowerState;
//! use hive_testing::clusterdeployment::{self, with_power_state};
//!
//! let cd = clusterdeployment::build([
//!     clusterdeployment::with_namespace("hive"),
//!     clusterdeployment::with_name("cd-1"),
//!     with_power_state(ClusterPowerState::Hibernating),
//! ]);
//! assert_eq!(cd.spec.power_state, Some(ClusterPowerState::Hibernating));
//! ```
//!
//! ## Fake clients
//!
//! ```rust
//! use hive_testing::client::ResourceInterface;
//! use hive_testing::clusterdeployment::{self, with_label};
//! use hive_testing::typed::FakeHiveV1;
//! use hive_testing::FakeBuilder;
//! use kube::api::ListParams;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = clusterdeployment::full_builder("hive", "cd-1", &hive_testing::apis::registry());
//! let fake = FakeBuilder::new()
//!     .with_object(builder.build([with_label("env", "prod")]))
//!     .build()?;
//!
//! let cds = FakeHiveV1::new(fake).cluster_deployments("hive");
//! let prod = cds.list(&ListParams::default().labels("env=prod")).await?;
//! assert_eq!(prod.items.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod apis;
pub mod client;
pub mod clusterdeployment;
mod error;
pub mod fake;
pub mod fake_builder;
mod field_selectors;
pub mod generic;
pub mod label_selector;
pub mod object_builder;
pub mod reactor;
pub mod registry;
pub mod tracker;
pub mod typed;
mod utils;
pub mod watch;

#[cfg(test)]
mod client_test;
#[cfg(test)]
mod fake_test;
#[cfg(test)]
mod utils_test;

pub use error::{Error, Result};
pub use fake::Fake;
pub use fake_builder::FakeBuilder;
